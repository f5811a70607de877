//! Driver errors.

use thiserror::Error;

use super::HostDistance;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum Error {
    #[error("{distance}: core connections ({core}) exceed max connections ({max})")]
    ConnectionsPerHostOrder {
        distance: HostDistance,
        core: u32,
        max: u32,
    },

    #[error("{distance}: {field} must be between {min} and {max}, got {value}")]
    RequestsPerConnectionRange {
        distance: HostDistance,
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("no contact points")]
    NoContactPoints,

    #[error("no host available: {0}")]
    NoHostAvailable(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("session is closed")]
    Closed,
}
