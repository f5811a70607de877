//! Configuration.

pub mod duration;
pub mod error;

use error::Error;

use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::driver::session::DEFAULT_PORT;
use crate::driver::{Compression, Credentials, ProtocolVersion};
use crate::pooling::PoolingOptionsBuilder;

static CONFIG: Lazy<ArcSwap<ConfigAndPath>> =
    Lazy::new(|| ArcSwap::from_pointee(ConfigAndPath::default()));

/// Currently loaded configuration.
pub fn config() -> Arc<ConfigAndPath> {
    CONFIG.load().clone()
}

/// Load and check the configuration file, then make it current.
pub fn load(path: &Path) -> Result<ConfigAndPath, Error> {
    let config = ConfigAndPath::load(path)?;
    config.config.check()?;
    CONFIG.store(Arc::new(config.clone()));
    Ok(config)
}

/// Configuration and where it came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigAndPath {
    pub config: Config,
    pub path: PathBuf,
}

impl ConfigAndPath {
    /// Read configuration from disk.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let source = read_to_string(path)?;
        let config = Config::parse(&source)?;
        info!("loaded \"{}\"", path.display());

        Ok(Self {
            config,
            path: path.to_owned(),
        })
    }
}

/// Configuration file.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Cassandra cluster and client settings.
    #[serde(default)]
    pub cassandra: Cassandra,
}

impl Config {
    /// Parse configuration from TOML.
    pub fn parse(source: &str) -> Result<Self, Error> {
        toml::from_str(source).map_err(|err| Error::config(source, err))
    }

    /// Reject settings that would make the client misbehave.
    pub fn check(&self) -> Result<(), Error> {
        let cassandra = &self.cassandra;

        if cassandra.contact_points.is_empty() {
            return Err(Error::NoContactPoints);
        }

        let mut seen = HashSet::new();
        for contact_point in &cassandra.contact_points {
            if contact_point.trim().is_empty() {
                return Err(Error::BlankContactPoint);
            }

            if !seen.insert(contact_point) {
                warn!("contact point \"{}\" is listed more than once", contact_point);
            }
        }

        cassandra.pooling()?;

        Ok(())
    }
}

/// Cassandra cluster settings.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Cassandra {
    /// Name reported by the client, for logs and metrics.
    pub cluster_name: Option<String>,
    /// Hosts used to discover the rest of the cluster.
    #[serde(default = "Cassandra::contact_points")]
    pub contact_points: Vec<String>,
    /// Native protocol port.
    #[serde(default = "Cassandra::port")]
    pub port: u16,
    /// Keyspace the session uses.
    pub keyspace: Option<String>,
    /// Protocol version. Negotiated if not set.
    pub protocol_version: Option<ProtocolVersion>,
    /// Frame compression.
    #[serde(default)]
    pub compression: Compression,
    /// Plain text authentication.
    pub auth: Option<Credentials>,
    /// Query used to check that a session works.
    #[serde(default = "Cassandra::validation_query")]
    pub validation_query: String,
    /// How long the validation query may take.
    #[serde(default = "Cassandra::health_check_timeout", with = "duration")]
    pub health_check_timeout: Duration,
    /// How long to wait for the session to close on shutdown.
    #[serde(default = "Cassandra::shutdown_grace_period", with = "duration")]
    pub shutdown_grace_period: Duration,
    /// Connection pool settings.
    #[serde(default)]
    pub pooling: Pooling,
}

impl Default for Cassandra {
    fn default() -> Self {
        Self {
            cluster_name: None,
            contact_points: Self::contact_points(),
            port: Self::port(),
            keyspace: None,
            protocol_version: None,
            compression: Compression::default(),
            auth: None,
            validation_query: Self::validation_query(),
            health_check_timeout: Self::health_check_timeout(),
            shutdown_grace_period: Self::shutdown_grace_period(),
            pooling: Pooling::default(),
        }
    }
}

impl Cassandra {
    fn contact_points() -> Vec<String> {
        vec!["127.0.0.1".into()]
    }

    fn port() -> u16 {
        DEFAULT_PORT
    }

    fn validation_query() -> String {
        "SELECT * FROM system.local WHERE key='local'".into()
    }

    fn health_check_timeout() -> Duration {
        Duration::from_secs(2)
    }

    fn shutdown_grace_period() -> Duration {
        Duration::from_secs(30)
    }

    /// Validated pooling settings.
    pub fn pooling(&self) -> Result<PoolingOptionsBuilder, Error> {
        Ok(PoolingOptionsBuilder::new(&self.pooling)?)
    }
}

/// Connection pool settings. Anything not set keeps the driver default.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Pooling {
    /// Keep-alive probe period on idle connections, 0 disables them.
    #[serde(default, with = "duration::option", skip_serializing_if = "Option::is_none")]
    pub heartbeat_interval: Option<Duration>,
    /// How long a request waits for a pooled connection.
    #[serde(default, with = "duration::option", skip_serializing_if = "Option::is_none")]
    pub pool_timeout: Option<Duration>,
    /// Close connections above core after they've been idle this long.
    #[serde(default, with = "duration::option", skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<Duration>,
    /// Requests allowed to wait for a connection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_queue_size: Option<i32>,
    /// Hosts in the local datacenter.
    #[serde(default)]
    pub local: PoolSize,
    /// Hosts in remote datacenters.
    #[serde(default)]
    pub remote: PoolSize,
}

/// Pool size for one host distance.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PoolSize {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_connections: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_requests_per_connection: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_connection_threshold: Option<i32>,
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::driver::{HostDistance, PoolingOptions};

    #[test]
    fn test_basic() {
        let source = r#"
[cassandra]
cluster_name = "main"
contact_points = ["10.0.0.1", "10.0.0.2"]
port = 9142
keyspace = "app"
protocol_version = "v4"
compression = "lz4"

[cassandra.auth]
username = "cassandra"
password = "cassandra"

[cassandra.pooling]
heartbeat_interval = "1m"
pool_timeout = "2s"

[cassandra.pooling.local]
core_connections = 1
max_connections = 3
max_requests_per_connection = 5
new_connection_threshold = 25

[cassandra.pooling.remote]
core_connections = 2
max_connections = 4
max_requests_per_connection = 6
new_connection_threshold = 30
"#;

        let config = Config::parse(source).unwrap();
        config.check().unwrap();

        let cassandra = &config.cassandra;
        assert_eq!(cassandra.cluster_name.as_deref(), Some("main"));
        assert_eq!(cassandra.contact_points, vec!["10.0.0.1", "10.0.0.2"]);
        assert_eq!(cassandra.port, 9142);
        assert_eq!(cassandra.protocol_version, Some(ProtocolVersion::V4));
        assert_eq!(cassandra.compression, Compression::Lz4);
        assert_eq!(cassandra.auth.as_ref().unwrap().username, "cassandra");
        assert_eq!(cassandra.pooling.heartbeat_interval, Some(Duration::from_secs(60)));
        assert_eq!(cassandra.pooling.pool_timeout, Some(Duration::from_secs(2)));
        assert_eq!(cassandra.pooling.idle_timeout, None);

        let pooling = cassandra.pooling().unwrap().build();
        assert_eq!(pooling.heartbeat_interval_seconds(), 60);
        assert_eq!(pooling.pool_timeout_millis(), 2000);
        assert_eq!(pooling.max_connections_per_host(HostDistance::Local), 3);
        assert_eq!(pooling.new_connection_threshold(HostDistance::Remote), 30);
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        config.check().unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.cassandra.port, 9042);
        assert_eq!(config.cassandra.contact_points, vec!["127.0.0.1"]);
        assert_eq!(config.cassandra.health_check_timeout, Duration::from_secs(2));
        assert_eq!(config.cassandra.shutdown_grace_period, Duration::from_secs(30));
        assert_eq!(
            config.cassandra.pooling().unwrap().build(),
            PoolingOptions::default()
        );
    }

    #[test]
    fn test_bad_duration() {
        let source = r#"
[cassandra.pooling]
heartbeat_interval = "one minute"
"#;

        match Config::parse(source).unwrap_err() {
            Error::Parse(message, line) => {
                assert!(message.contains("invalid duration"), "{}", message);
                assert_eq!(line, 3);
            }
            err => panic!("unexpected error: {:?}", err),
        }
    }

    #[test]
    fn test_unknown_field() {
        let source = r#"
[cassandra.pooling.local]
core_connection = 1
"#;

        assert!(matches!(
            Config::parse(source).unwrap_err(),
            Error::Parse(_, 3)
        ));
    }

    #[test]
    fn test_invalid_pool_size() {
        let source = r#"
[cassandra.pooling.remote]
core_connections = 4
max_connections = 2
"#;

        let config = Config::parse(source).unwrap();
        let err = config.check().unwrap_err();

        assert!(matches!(err, Error::Pooling(_)));
        assert_eq!(
            err.to_string(),
            "cassandra.pooling.remote: max_connections (2) must not be less than core_connections (4)"
        );
    }

    #[test]
    fn test_subsecond_heartbeat() {
        let source = r#"
[cassandra.pooling]
heartbeat_interval = "500ms"
"#;

        let err = Config::parse(source).unwrap().check().unwrap_err();
        assert!(matches!(err, Error::Pooling(_)));
        assert!(err.to_string().contains("below one second"), "{}", err);
    }

    #[test]
    fn test_negative_value() {
        let source = r#"
[cassandra.pooling.local]
core_connections = -1
"#;

        let err = Config::parse(source).unwrap().check().unwrap_err();
        assert_eq!(
            err.to_string(),
            "cassandra.pooling.local: core_connections must be at least 0, got -1"
        );
    }

    #[test]
    fn test_contact_points() {
        let config = Config::parse("[cassandra]\ncontact_points = []\n").unwrap();
        assert!(matches!(config.check(), Err(Error::NoContactPoints)));

        let config = Config::parse("[cassandra]\ncontact_points = [\" \"]\n").unwrap();
        assert!(matches!(config.check(), Err(Error::BlankContactPoint)));

        let config =
            Config::parse("[cassandra]\ncontact_points = [\"a\", \"a\"]\n").unwrap();
        assert!(config.check().is_ok());
    }

    #[test]
    fn test_load() {
        let path = std::env::temp_dir().join(format!(
            "cassandra-pooling-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[cassandra]\nkeyspace = \"app\"\n\n[cassandra.pooling]\npool_timeout = \"250ms\"\n",
        )
        .unwrap();

        let loaded = load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.path, path);
        assert_eq!(config().config, loaded.config);
        assert_eq!(
            loaded.config.cassandra.pooling.pool_timeout,
            Some(Duration::from_millis(250))
        );

        assert!(matches!(load(&path), Err(Error::Io(_))));
    }
}
