//! Connect to a cluster and keep the session around.

use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use super::Error;
use crate::config::Cassandra;
use crate::driver::{ClusterSettings, Connector, Row, Session};
use crate::util::human_duration;

/// Everything the driver needs, with fully built pooling options.
pub fn cluster_settings(cassandra: &Cassandra) -> Result<ClusterSettings, Error> {
    let pooling = cassandra.pooling()?.build();

    let settings = ClusterSettings::new(cassandra.contact_points.clone(), pooling)?
        .port(cassandra.port)
        .cluster_name(cassandra.cluster_name.clone())
        .keyspace(cassandra.keyspace.clone())
        .credentials(cassandra.auth.clone())
        .protocol_version(cassandra.protocol_version)
        .compression(cassandra.compression);

    Ok(settings)
}

/// Creates sessions using the given driver connector.
pub struct SessionFactory<C> {
    connector: C,
}

impl<C: Connector> SessionFactory<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    /// Connect and make sure the session can run the validation query.
    pub async fn build(&self, cassandra: &Cassandra) -> Result<ManagedSession, Error> {
        let settings = cluster_settings(cassandra)?;

        info!(
            "connecting to {} [keyspace: {}]",
            settings.addrs().join(", "),
            settings.get_keyspace().unwrap_or("none"),
        );

        let session = ManagedSession {
            session: self.connector.connect(settings).await?,
            validation_query: cassandra.validation_query.clone(),
            health_check_timeout: cassandra.health_check_timeout,
            shutdown_grace_period: cassandra.shutdown_grace_period,
        };

        if let Err(err) = session.health_check().await {
            error!("{}", err);
            if let Err(close_err) = session.shutdown().await {
                warn!("{}", close_err);
            }
            return Err(err);
        }

        info!("session ready");

        Ok(session)
    }
}

/// Connected session with a health check and a bounded shutdown.
pub struct ManagedSession {
    session: Box<dyn Session>,
    validation_query: String,
    health_check_timeout: Duration,
    shutdown_grace_period: Duration,
}

impl std::fmt::Debug for ManagedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedSession")
            .field("validation_query", &self.validation_query)
            .field("health_check_timeout", &self.health_check_timeout)
            .field("shutdown_grace_period", &self.shutdown_grace_period)
            .finish()
    }
}

impl ManagedSession {
    /// The driver session.
    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    /// Run a query on the session.
    pub async fn execute(&self, query: &str) -> Result<Vec<Row>, Error> {
        Ok(self.session.execute(query).await?)
    }

    /// Run the validation query, giving up after the health check timeout.
    pub async fn health_check(&self) -> Result<(), Error> {
        match timeout(
            self.health_check_timeout,
            self.session.execute(&self.validation_query),
        )
        .await
        {
            Ok(Ok(rows)) => {
                debug!("validation query returned {} rows", rows.len());
                Ok(())
            }
            Ok(Err(err)) => Err(Error::ValidationQuery(err)),
            Err(_) => Err(Error::HealthCheckTimeout(self.health_check_timeout)),
        }
    }

    /// Close the session, waiting at most the shutdown grace period.
    pub async fn shutdown(self) -> Result<(), Error> {
        info!("closing session");

        match timeout(self.shutdown_grace_period, self.session.close()).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                warn!(
                    "session didn't close within {}, giving up",
                    human_duration(self.shutdown_grace_period)
                );
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::config::{PoolSize, Pooling};
    use crate::driver::{self, Compression, HostDistance, PoolingOptions};

    #[derive(Default)]
    struct Recorded {
        settings: Vec<ClusterSettings>,
        queries: Vec<String>,
        closed: bool,
    }

    #[derive(Clone, Default)]
    struct FakeDriver {
        recorded: Arc<Mutex<Recorded>>,
        query_delay: Duration,
        close_delay: Duration,
        fail_queries: bool,
        fail_close: bool,
    }

    struct FakeSession {
        driver: FakeDriver,
    }

    #[async_trait]
    impl Session for FakeSession {
        async fn execute(&self, query: &str) -> Result<Vec<Row>, driver::Error> {
            self.driver.recorded.lock().queries.push(query.to_string());
            tokio::time::sleep(self.driver.query_delay).await;

            if self.driver.fail_queries {
                Err(driver::Error::Query("unavailable".into()))
            } else {
                Ok(vec![Row::new(vec![Some("local".into())])])
            }
        }

        async fn close(&self) -> Result<(), driver::Error> {
            tokio::time::sleep(self.driver.close_delay).await;
            if self.driver.fail_close {
                return Err(driver::Error::Closed);
            }
            self.driver.recorded.lock().closed = true;
            Ok(())
        }
    }

    #[async_trait]
    impl Connector for FakeDriver {
        async fn connect(&self, settings: ClusterSettings) -> Result<Box<dyn Session>, driver::Error> {
            self.recorded.lock().settings.push(settings);
            Ok(Box::new(FakeSession {
                driver: self.clone(),
            }))
        }
    }

    fn cassandra() -> Cassandra {
        Cassandra {
            contact_points: vec!["10.0.0.1".into()],
            keyspace: Some("app".into()),
            compression: Compression::Snappy,
            health_check_timeout: Duration::from_millis(50),
            shutdown_grace_period: Duration::from_millis(50),
            pooling: Pooling {
                heartbeat_interval: Some(Duration::from_secs(60)),
                local: PoolSize {
                    core_connections: Some(2),
                    max_connections: Some(4),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_cluster_settings() {
        let settings = cluster_settings(&cassandra()).unwrap();

        assert_eq!(settings.contact_points(), &["10.0.0.1".to_string()]);
        assert_eq!(settings.get_port(), 9042);
        assert_eq!(settings.get_keyspace(), Some("app"));
        assert_eq!(settings.get_compression(), Compression::Snappy);
        assert_eq!(settings.pooling().heartbeat_interval_seconds(), 60);
        assert_eq!(
            settings
                .pooling()
                .core_connections_per_host(HostDistance::Local),
            2
        );
        assert_eq!(
            settings.pooling().connections_per_host(HostDistance::Remote),
            PoolingOptions::default().connections_per_host(HostDistance::Remote)
        );
    }

    #[test]
    fn test_cluster_settings_invalid_pooling() {
        let mut cassandra = cassandra();
        cassandra.pooling.local.max_requests_per_connection = Some(0);

        assert!(matches!(
            cluster_settings(&cassandra),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_build() {
        let driver = FakeDriver::default();
        let factory = SessionFactory::new(driver.clone());
        let cassandra = cassandra();

        let session = factory.build(&cassandra).await.unwrap();

        {
            let recorded = driver.recorded.lock();
            assert_eq!(recorded.settings.len(), 1);
            assert_eq!(recorded.settings[0], cluster_settings(&cassandra).unwrap());
            assert_eq!(recorded.queries, vec![cassandra.validation_query.clone()]);
        }

        let rows = session.execute("SELECT key FROM system.local").await.unwrap();
        assert_eq!(rows[0].get_string(0), Some("local"));

        session.shutdown().await.unwrap();
        assert!(driver.recorded.lock().closed);
    }

    #[tokio::test]
    async fn test_build_validation_query_fails() {
        let driver = FakeDriver {
            fail_queries: true,
            ..Default::default()
        };
        let factory = SessionFactory::new(driver.clone());

        let err = factory.build(&cassandra()).await.unwrap_err();

        assert!(matches!(err, Error::ValidationQuery(driver::Error::Query(_))));
        assert!(driver.recorded.lock().closed);
    }

    #[tokio::test]
    async fn test_validation_error_survives_failed_close() {
        let driver = FakeDriver {
            fail_queries: true,
            fail_close: true,
            ..Default::default()
        };
        let factory = SessionFactory::new(driver.clone());

        let err = factory.build(&cassandra()).await.unwrap_err();

        assert!(matches!(err, Error::ValidationQuery(driver::Error::Query(_))));
        assert!(!driver.recorded.lock().closed);
    }

    #[tokio::test]
    async fn test_health_check_timeout() {
        let driver = FakeDriver {
            query_delay: Duration::from_secs(5),
            ..Default::default()
        };
        let factory = SessionFactory::new(driver);

        let err = factory.build(&cassandra()).await.unwrap_err();

        assert!(matches!(err, Error::HealthCheckTimeout(elapsed) if elapsed == Duration::from_millis(50)));
    }

    #[tokio::test]
    async fn test_shutdown_grace_period() {
        let driver = FakeDriver {
            close_delay: Duration::from_secs(5),
            ..Default::default()
        };
        let factory = SessionFactory::new(driver.clone());
        let session = factory.build(&cassandra()).await.unwrap();

        session.shutdown().await.unwrap();

        assert!(!driver.recorded.lock().closed);
    }

    #[tokio::test]
    async fn test_no_contact_points() {
        let factory = SessionFactory::new(FakeDriver::default());
        let mut cassandra = cassandra();
        cassandra.contact_points.clear();

        let err = factory.build(&cassandra).await.unwrap_err();

        assert!(matches!(err, Error::Driver(driver::Error::NoContactPoints)));
    }
}
