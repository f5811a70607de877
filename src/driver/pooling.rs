//! Native pooling options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Error, HostDistance};

/// Stream ids available on one connection (protocol v3 and later).
pub const MAX_STREAMS_PER_CONNECTION: u32 = 32_768;

/// Pool sizing for one distance class.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionsPerHost {
    /// Connections opened eagerly and kept open.
    pub core: u32,
    /// Upper bound on connections to one host.
    pub max: u32,
    /// Concurrent requests on a single connection.
    pub max_requests_per_connection: u32,
    /// In-flight requests that trigger opening another connection.
    pub new_connection_threshold: u32,
}

/// Pooling options, as understood by the driver.
///
/// [`PoolingOptions::default`] holds the driver's built-in values. Setters
/// don't check anything; [`PoolingOptions::validate`] runs when a cluster is
/// assembled.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct PoolingOptions {
    local: ConnectionsPerHost,
    remote: ConnectionsPerHost,
    /// 0 disables heartbeats.
    heartbeat_interval_seconds: u32,
    /// 0 means don't wait for a connection.
    pool_timeout_millis: u32,
    idle_timeout_seconds: u32,
    max_queue_size: u32,
}

impl Default for PoolingOptions {
    fn default() -> Self {
        Self {
            local: ConnectionsPerHost {
                core: 1,
                max: 1,
                max_requests_per_connection: 1024,
                new_connection_threshold: 800,
            },
            remote: ConnectionsPerHost {
                core: 1,
                max: 1,
                max_requests_per_connection: 256,
                new_connection_threshold: 200,
            },
            heartbeat_interval_seconds: 30,
            pool_timeout_millis: 5_000,
            idle_timeout_seconds: 120,
            max_queue_size: 256,
        }
    }
}

impl PoolingOptions {
    /// Sizing for the given distance.
    pub fn connections_per_host(&self, distance: HostDistance) -> &ConnectionsPerHost {
        match distance {
            HostDistance::Local => &self.local,
            HostDistance::Remote => &self.remote,
        }
    }

    fn connections_per_host_mut(&mut self, distance: HostDistance) -> &mut ConnectionsPerHost {
        match distance {
            HostDistance::Local => &mut self.local,
            HostDistance::Remote => &mut self.remote,
        }
    }

    pub fn core_connections_per_host(&self, distance: HostDistance) -> u32 {
        self.connections_per_host(distance).core
    }

    pub fn max_connections_per_host(&self, distance: HostDistance) -> u32 {
        self.connections_per_host(distance).max
    }

    pub fn max_requests_per_connection(&self, distance: HostDistance) -> u32 {
        self.connections_per_host(distance).max_requests_per_connection
    }

    pub fn new_connection_threshold(&self, distance: HostDistance) -> u32 {
        self.connections_per_host(distance).new_connection_threshold
    }

    pub fn heartbeat_interval_seconds(&self) -> u32 {
        self.heartbeat_interval_seconds
    }

    pub fn pool_timeout_millis(&self) -> u32 {
        self.pool_timeout_millis
    }

    pub fn idle_timeout_seconds(&self) -> u32 {
        self.idle_timeout_seconds
    }

    pub fn max_queue_size(&self) -> u32 {
        self.max_queue_size
    }

    /// Heartbeat interval as a duration. `None` if heartbeats are disabled.
    pub fn heartbeat_interval(&self) -> Option<Duration> {
        match self.heartbeat_interval_seconds {
            0 => None,
            seconds => Some(Duration::from_secs(seconds as u64)),
        }
    }

    /// Pool timeout as a duration.
    pub fn pool_timeout(&self) -> Duration {
        Duration::from_millis(self.pool_timeout_millis as u64)
    }

    pub fn set_core_connections_per_host(&mut self, distance: HostDistance, core: u32) -> &mut Self {
        self.connections_per_host_mut(distance).core = core;
        self
    }

    pub fn set_max_connections_per_host(&mut self, distance: HostDistance, max: u32) -> &mut Self {
        self.connections_per_host_mut(distance).max = max;
        self
    }

    pub fn set_max_requests_per_connection(
        &mut self,
        distance: HostDistance,
        max_requests: u32,
    ) -> &mut Self {
        self.connections_per_host_mut(distance)
            .max_requests_per_connection = max_requests;
        self
    }

    pub fn set_new_connection_threshold(&mut self, distance: HostDistance, threshold: u32) -> &mut Self {
        self.connections_per_host_mut(distance).new_connection_threshold = threshold;
        self
    }

    pub fn set_heartbeat_interval_seconds(&mut self, seconds: u32) -> &mut Self {
        self.heartbeat_interval_seconds = seconds;
        self
    }

    pub fn set_pool_timeout_millis(&mut self, millis: u32) -> &mut Self {
        self.pool_timeout_millis = millis;
        self
    }

    pub fn set_idle_timeout_seconds(&mut self, seconds: u32) -> &mut Self {
        self.idle_timeout_seconds = seconds;
        self
    }

    pub fn set_max_queue_size(&mut self, size: u32) -> &mut Self {
        self.max_queue_size = size;
        self
    }

    /// Check the options before they are used to build a cluster.
    pub fn validate(&self) -> Result<(), Error> {
        for distance in HostDistance::ALL {
            let pool = self.connections_per_host(distance);

            if pool.core > pool.max {
                return Err(Error::ConnectionsPerHostOrder {
                    distance,
                    core: pool.core,
                    max: pool.max,
                });
            }

            let ranges = [
                (
                    "max requests per connection",
                    pool.max_requests_per_connection,
                    1,
                ),
                ("new connection threshold", pool.new_connection_threshold, 0),
            ];

            for (field, value, min) in ranges {
                if value < min || value > MAX_STREAMS_PER_CONNECTION {
                    return Err(Error::RequestsPerConnectionRange {
                        distance,
                        field,
                        value,
                        min,
                        max: MAX_STREAMS_PER_CONNECTION,
                    });
                }
            }
        }

        Ok(())
    }
}
