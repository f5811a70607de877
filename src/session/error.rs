//! Session errors.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("config: {0}")]
    Config(#[from] crate::config::error::Error),

    #[error("driver: {0}")]
    Driver(#[from] crate::driver::Error),

    #[error("validation query failed: {0}")]
    ValidationQuery(#[source] crate::driver::Error),

    #[error("validation query timed out after {0:?}")]
    HealthCheckTimeout(Duration),
}
