//! Cluster settings and the session interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Error, PoolingOptions};

/// Default native protocol port.
pub const DEFAULT_PORT: u16 = 9042;

/// Native protocol version. `None` in [`ClusterSettings`] lets the driver negotiate.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVersion {
    V3,
    V4,
    V5,
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V3 => write!(f, "v3"),
            Self::V4 => write!(f, "v4"),
            Self::V5 => write!(f, "v5"),
        }
    }
}

/// Frame compression.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Compression {
    #[default]
    None,
    Lz4,
    Snappy,
}

/// Plain text credentials.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Everything the driver needs to connect to a cluster.
///
/// Pooling options are moved in at construction and can't be changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    contact_points: Vec<String>,
    pooling: PoolingOptions,
    port: u16,
    cluster_name: Option<String>,
    keyspace: Option<String>,
    credentials: Option<Credentials>,
    protocol_version: Option<ProtocolVersion>,
    compression: Compression,
}

impl ClusterSettings {
    /// Assemble cluster settings, checking the pooling options.
    pub fn new(contact_points: Vec<String>, pooling: PoolingOptions) -> Result<Self, Error> {
        if contact_points.is_empty() {
            return Err(Error::NoContactPoints);
        }

        pooling.validate()?;

        Ok(Self {
            contact_points,
            pooling,
            port: DEFAULT_PORT,
            cluster_name: None,
            keyspace: None,
            credentials: None,
            protocol_version: None,
            compression: Compression::default(),
        })
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn cluster_name(mut self, name: Option<String>) -> Self {
        self.cluster_name = name;
        self
    }

    pub fn keyspace(mut self, keyspace: Option<String>) -> Self {
        self.keyspace = keyspace;
        self
    }

    pub fn credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn protocol_version(mut self, version: Option<ProtocolVersion>) -> Self {
        self.protocol_version = version;
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    pub fn contact_points(&self) -> &[String] {
        &self.contact_points
    }

    pub fn pooling(&self) -> &PoolingOptions {
        &self.pooling
    }

    pub fn get_port(&self) -> u16 {
        self.port
    }

    pub fn get_cluster_name(&self) -> Option<&str> {
        self.cluster_name.as_deref()
    }

    pub fn get_keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    pub fn get_credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn get_protocol_version(&self) -> Option<ProtocolVersion> {
        self.protocol_version
    }

    pub fn get_compression(&self) -> Compression {
        self.compression
    }

    /// Contact points with the port, e.g. `10.0.0.1:9042`.
    pub fn addrs(&self) -> Vec<String> {
        self.contact_points
            .iter()
            .map(|host| format!("{}:{}", host, self.port))
            .collect()
    }
}

/// A row returned by a query. Columns are rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    columns: Vec<Option<String>>,
}

impl Row {
    pub fn new(columns: Vec<Option<String>>) -> Self {
        Self { columns }
    }

    /// Column at `index`, if present and not null.
    pub fn get_string(&self, index: usize) -> Option<&str> {
        self.columns.get(index).and_then(|c| c.as_deref())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Connected client session.
#[async_trait]
pub trait Session: Send + Sync {
    /// Run a query and collect all rows.
    async fn execute(&self, query: &str) -> Result<Vec<Row>, Error>;

    /// Close every pooled connection.
    async fn close(&self) -> Result<(), Error>;
}

/// Exchanges cluster settings for a connected session.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, settings: ClusterSettings) -> Result<Box<dyn Session>, Error>;
}
