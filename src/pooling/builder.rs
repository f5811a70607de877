//! Turn pooling configuration into the driver's pooling options.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use super::{Error, HostDistanceOptions};
use crate::config::Pooling;
use crate::driver::{HostDistance, PoolingOptions};
use crate::util::human_duration;

/// Validated pooling settings.
///
/// Anything left unset keeps the value found in [`PoolingOptions::default`],
/// so driver defaults are never copied here.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct PoolingOptionsBuilder {
    #[serde(with = "crate::config::duration::option")]
    heartbeat_interval: Option<Duration>,
    #[serde(with = "crate::config::duration::option")]
    pool_timeout: Option<Duration>,
    #[serde(with = "crate::config::duration::option")]
    idle_timeout: Option<Duration>,
    max_queue_size: Option<u32>,
    local: HostDistanceOptions,
    remote: HostDistanceOptions,
}

impl PoolingOptionsBuilder {
    /// Validate pooling configuration.
    pub fn new(config: &Pooling) -> Result<Self, Error> {
        let local = HostDistanceOptions::new(&config.local)
            .map_err(|err| err.at(HostDistance::Local))?;
        let remote = HostDistanceOptions::new(&config.remote)
            .map_err(|err| err.at(HostDistance::Remote))?;

        let max_queue_size = match config.max_queue_size {
            Some(size) if size < 0 => {
                return Err(Error::BelowMinimum {
                    field: "max_queue_size",
                    value: size as i64,
                    min: 0,
                })
            }
            size => size.map(|size| size as u32),
        };

        let builder = Self {
            heartbeat_interval: config.heartbeat_interval,
            pool_timeout: config.pool_timeout,
            idle_timeout: config.idle_timeout,
            max_queue_size,
            local,
            remote,
        };

        builder.check()?;

        Ok(builder)
    }

    /// Check what can only be checked against the driver defaults.
    fn check(&self) -> Result<(), Error> {
        let max_seconds = Duration::from_secs(u32::MAX as u64);
        let max_millis = Duration::from_millis(u32::MAX as u64);

        for (field, value, max) in [
            ("heartbeat_interval", self.heartbeat_interval, max_seconds),
            ("pool_timeout", self.pool_timeout, max_millis),
            ("idle_timeout", self.idle_timeout, max_seconds),
        ] {
            if let Some(value) = value {
                if value > max {
                    return Err(Error::DurationOutOfRange { field, value, max });
                }
            }
        }

        if let Some(interval) = self.heartbeat_interval {
            // Whole seconds only, and 0 would turn heartbeats off.
            if !interval.is_zero() && interval.as_secs() == 0 {
                return Err(Error::SubsecondHeartbeat(interval));
            }

            if interval.subsec_nanos() > 0 {
                warn!(
                    "heartbeat_interval of {} is rounded down to whole seconds",
                    human_duration(interval)
                );
            }
        }

        let defaults = PoolingOptions::default();

        for distance in HostDistance::ALL {
            let options = self.options(distance);

            match (options.core_connections(), options.max_connections()) {
                (Some(core), None) if core > defaults.max_connections_per_host(distance) => {
                    return Err(Error::ConflictsWithDefault {
                        field: "core_connections",
                        value: core,
                        other: "max_connections",
                        default: defaults.max_connections_per_host(distance),
                    }
                    .at(distance));
                }

                (None, Some(max)) if max < defaults.core_connections_per_host(distance) => {
                    return Err(Error::ConflictsWithDefault {
                        field: "max_connections",
                        value: max,
                        other: "core_connections",
                        default: defaults.core_connections_per_host(distance),
                    }
                    .at(distance));
                }

                _ => (),
            }
        }

        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Option<Duration> {
        self.heartbeat_interval
    }

    pub fn pool_timeout(&self) -> Option<Duration> {
        self.pool_timeout
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    pub fn max_queue_size(&self) -> Option<u32> {
        self.max_queue_size
    }

    pub fn local(&self) -> &HostDistanceOptions {
        &self.local
    }

    pub fn remote(&self) -> &HostDistanceOptions {
        &self.remote
    }

    /// Sizing for the given distance.
    pub fn options(&self, distance: HostDistance) -> &HostDistanceOptions {
        match distance {
            HostDistance::Local => &self.local,
            HostDistance::Remote => &self.remote,
        }
    }

    /// Build the driver's pooling options.
    pub fn build(&self) -> PoolingOptions {
        let mut pooling = PoolingOptions::default();

        if let Some(interval) = self.heartbeat_interval {
            pooling.set_heartbeat_interval_seconds(saturate(interval.as_secs()));
        }

        if let Some(timeout) = self.pool_timeout {
            pooling.set_pool_timeout_millis(saturate(timeout.as_millis() as u64));
        }

        if let Some(timeout) = self.idle_timeout {
            pooling.set_idle_timeout_seconds(saturate(timeout.as_secs()));
        }

        if let Some(size) = self.max_queue_size {
            pooling.set_max_queue_size(size);
        }

        for distance in HostDistance::ALL {
            let options = self.options(distance);

            // Core is applied before max. The native setters don't compare the two,
            // ClusterSettings::new checks core <= max once both are in place.
            if let Some(core) = options.core_connections() {
                pooling.set_core_connections_per_host(distance, core);
            }

            if let Some(max) = options.max_connections() {
                pooling.set_max_connections_per_host(distance, max);
            }

            if let Some(max_requests) = options.max_requests_per_connection() {
                pooling.set_max_requests_per_connection(distance, max_requests);
            }

            if let Some(threshold) = options.new_connection_threshold() {
                pooling.set_new_connection_threshold(distance, threshold);
            }
        }

        debug!("pooling options: {:?}", pooling);

        pooling
    }
}

// Values are range checked in PoolingOptionsBuilder::check.
fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
