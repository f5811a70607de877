//! Boundary to the Cassandra driver.
//!
//! Everything the driver owns (native pooling settings and their defaults,
//! cluster assembly, sessions) is reached through this module.

pub mod error;
pub mod pooling;
pub mod session;

pub use error::Error;
pub use pooling::{ConnectionsPerHost, PoolingOptions};
pub use session::{
    ClusterSettings, Compression, Connector, Credentials, ProtocolVersion, Row, Session,
};

use serde::{Deserialize, Serialize};

/// How far a host is from the client, as seen by the load balancer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HostDistance {
    Local,
    Remote,
}

impl HostDistance {
    /// Both distance classes, in the order they are applied.
    pub const ALL: [HostDistance; 2] = [HostDistance::Local, HostDistance::Remote];
}

impl std::fmt::Display for HostDistance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}
