//! Pool settings validation errors.

use std::time::Duration;

use thiserror::Error;

use crate::driver::HostDistance;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum Error {
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        value: i64,
        min: i64,
    },

    #[error("{field} must be at most {max}, got {value}")]
    AboveMaximum {
        field: &'static str,
        value: i64,
        max: i64,
    },

    #[error("max_connections ({max}) must not be less than core_connections ({core})")]
    MaxBelowCore { core: u32, max: u32 },

    #[error("{field} ({value}) conflicts with the driver default {other} ({default}), set {other} as well")]
    ConflictsWithDefault {
        field: &'static str,
        value: u32,
        other: &'static str,
        default: u32,
    },

    #[error("{field} of {value:?} is too large, the driver accepts up to {max:?}")]
    DurationOutOfRange {
        field: &'static str,
        value: Duration,
        max: Duration,
    },

    #[error("heartbeat_interval of {0:?} is below one second, use 0 to disable heartbeats")]
    SubsecondHeartbeat(Duration),

    #[error("{distance}: {source}")]
    Distance {
        distance: HostDistance,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Attach the distance class this error was found in.
    pub fn at(self, distance: HostDistance) -> Self {
        Self::Distance {
            distance,
            source: Box::new(self),
        }
    }
}
