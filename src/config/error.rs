//! Configuration errors.

use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}, line {1}")]
    Parse(String, usize),

    #[error("cassandra.pooling.{0}")]
    Pooling(#[from] crate::pooling::Error),

    #[error("cassandra.contact_points is empty")]
    NoContactPoints,

    #[error("cassandra.contact_points contains a blank entry")]
    BlankContactPoint,
}

impl Error {
    /// Attach the line number of the offending value to a parse error.
    pub fn config(source: &str, err: toml::de::Error) -> Self {
        let message = err.message().to_string();

        match err.span() {
            Some(span) => {
                let end = span.start.min(source.len());
                let line = source.as_bytes()[..end]
                    .iter()
                    .filter(|c| **c == b'\n')
                    .count()
                    + 1;
                Self::Parse(message, line)
            }
            None => Self::Parse(message, 0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(serde::Deserialize, Debug)]
    #[allow(dead_code)]
    struct Cassandra {
        port: u16,
        keyspace: String,
    }

    #[test]
    fn test_line_number() {
        let source = "port = 9042\nkeyspace = 5\n";
        let err = toml::from_str::<Cassandra>(source).unwrap_err();

        match Error::config(source, err) {
            Error::Parse(message, line) => {
                assert_eq!(line, 2);
                assert!(message.contains("invalid type"));
            }
            err => panic!("unexpected error: {:?}", err),
        }
    }
}
