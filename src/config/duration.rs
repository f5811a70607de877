//! Durations written as "500ms", "2s", "1m" and so on.
//!
//! Use with `#[serde(with = "duration")]`, or `duration::option`
//! for optional fields.

use std::time::Duration;

use serde::{de, Deserialize, Deserializer, Serializer};

use crate::util::{human_duration, parse_duration};

pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&human_duration(*value))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let value = String::deserialize(deserializer)?;
    parse(&value)
}

fn parse<E: de::Error>(value: &str) -> Result<Duration, E> {
    parse_duration(value).ok_or_else(|| {
        E::custom(format!(
            "invalid duration \"{}\", expected a number followed by ms, s, m, h or d",
            value
        ))
    })
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => super::serialize(value, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            Some(value) => parse(&value).map(Some),
            None => Ok(None),
        }
    }
}
