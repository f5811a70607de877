//! Pool sizing for one host distance class.

use serde::Serialize;

use super::Error;
use crate::config::PoolSize;
use crate::driver::pooling::MAX_STREAMS_PER_CONNECTION;

/// Validated pool sizing for one distance class.
///
/// `None` means the operator didn't set the field and the driver default
/// stays in place. `Some(0)` is a real value.
#[derive(Debug, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostDistanceOptions {
    core_connections: Option<u32>,
    max_connections: Option<u32>,
    max_requests_per_connection: Option<u32>,
    new_connection_threshold: Option<u32>,
}

impl HostDistanceOptions {
    /// Validate sizing values from configuration.
    pub fn new(config: &PoolSize) -> Result<Self, Error> {
        let stream_limit = MAX_STREAMS_PER_CONNECTION as i64;

        let core_connections = bounded("core_connections", config.core_connections, 0, None)?;
        let max_connections = bounded("max_connections", config.max_connections, 0, None)?;
        let max_requests_per_connection = bounded(
            "max_requests_per_connection",
            config.max_requests_per_connection,
            1,
            Some(stream_limit),
        )?;
        let new_connection_threshold = bounded(
            "new_connection_threshold",
            config.new_connection_threshold,
            0,
            Some(stream_limit),
        )?;

        if let (Some(core), Some(max)) = (core_connections, max_connections) {
            if max < core {
                return Err(Error::MaxBelowCore { core, max });
            }
        }

        Ok(Self {
            core_connections,
            max_connections,
            max_requests_per_connection,
            new_connection_threshold,
        })
    }

    pub fn core_connections(&self) -> Option<u32> {
        self.core_connections
    }

    pub fn max_connections(&self) -> Option<u32> {
        self.max_connections
    }

    pub fn max_requests_per_connection(&self) -> Option<u32> {
        self.max_requests_per_connection
    }

    pub fn new_connection_threshold(&self) -> Option<u32> {
        self.new_connection_threshold
    }

    /// Nothing was set, the driver defaults apply as-is.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn bounded(
    field: &'static str,
    value: Option<i32>,
    min: i64,
    max: Option<i64>,
) -> Result<Option<u32>, Error> {
    let Some(value) = value else {
        return Ok(None);
    };
    let value = value as i64;

    if value < min {
        return Err(Error::BelowMinimum { field, value, min });
    }

    if let Some(max) = max {
        if value > max {
            return Err(Error::AboveMaximum { field, value, max });
        }
    }

    // Non-negative i32 always fits.
    Ok(Some(value as u32))
}
