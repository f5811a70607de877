use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::config;
use crate::driver::{HostDistance, PoolingOptions};
use crate::pooling::PoolingOptionsBuilder;
use crate::util::human_duration;

/// Check Cassandra connection pool settings before the client uses them.
#[derive(Parser, Debug)]
pub struct Cli {
    /// Path to the configuration file. Default: "cassandra.toml"
    #[arg(short, long, default_value = "cassandra.toml")]
    pub config: PathBuf,
    /// Subcommand.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the configuration and show the pool settings the driver will get.
    Check {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the driver's default pool settings.
    Defaults {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct Report<'a> {
    configured: &'a PoolingOptionsBuilder,
    resolved: &'a PoolingOptions,
}

/// Validate the configuration file and print the resolved pool settings.
pub fn check(path: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load(path)?;
    let builder = config.config.cassandra.pooling()?;
    let pooling = builder.build();

    if json {
        let report = Report {
            configured: &builder,
            resolved: &pooling,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render(&builder, &pooling));
    }

    Ok(())
}

/// Print the driver defaults.
pub fn defaults(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let builder = PoolingOptionsBuilder::default();
    let pooling = builder.build();

    if json {
        println!("{}", serde_json::to_string_pretty(&pooling)?);
    } else {
        print!("{}", render(&builder, &pooling));
    }

    Ok(())
}

/// Pool settings as a table. Values nobody configured are marked as defaults.
pub fn render(builder: &PoolingOptionsBuilder, pooling: &PoolingOptions) -> String {
    let mark = |set: bool| if set { "" } else { " (default)" };
    let seconds = |s: u32| human_duration(Duration::from_secs(s as u64));
    let mut out = String::new();

    let globals = [
        (
            "heartbeat_interval",
            seconds(pooling.heartbeat_interval_seconds()),
            builder.heartbeat_interval().is_some(),
        ),
        (
            "pool_timeout",
            human_duration(pooling.pool_timeout()),
            builder.pool_timeout().is_some(),
        ),
        (
            "idle_timeout",
            seconds(pooling.idle_timeout_seconds()),
            builder.idle_timeout().is_some(),
        ),
        (
            "max_queue_size",
            pooling.max_queue_size().to_string(),
            builder.max_queue_size().is_some(),
        ),
    ];

    for (name, value, set) in globals {
        let _ = writeln!(out, "{:<30}{}{}", name, value, mark(set));
    }

    for distance in HostDistance::ALL {
        let options = builder.options(distance);
        let _ = writeln!(out, "\n[{}]", distance);

        let fields = [
            (
                "core_connections",
                pooling.core_connections_per_host(distance),
                options.core_connections().is_some(),
            ),
            (
                "max_connections",
                pooling.max_connections_per_host(distance),
                options.max_connections().is_some(),
            ),
            (
                "max_requests_per_connection",
                pooling.max_requests_per_connection(distance),
                options.max_requests_per_connection().is_some(),
            ),
            (
                "new_connection_threshold",
                pooling.new_connection_threshold(distance),
                options.new_connection_threshold().is_some(),
            ),
        ];

        for (name, value, set) in fields {
            let _ = writeln!(out, "{:<30}{}{}", name, value, mark(set));
        }
    }

    out
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{PoolSize, Pooling};

    #[test]
    fn test_render() {
        let builder = PoolingOptionsBuilder::new(&Pooling {
            heartbeat_interval: Some(Duration::from_secs(60)),
            local: PoolSize {
                core_connections: Some(1),
                max_connections: Some(3),
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap();

        let table = render(&builder, &builder.build());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], format!("{:<30}1m", "heartbeat_interval"));
        assert_eq!(lines[1], format!("{:<30}5s (default)", "pool_timeout"));
        assert!(table.contains("[local]\ncore_connections              1\n"));
        assert!(table.contains("max_connections               3\n"));
        assert!(table.contains("[remote]\ncore_connections              1 (default)\n"));
    }

    #[test]
    fn test_cli() {
        let cli = Cli::parse_from(["cassandra-pooling", "-c", "app.toml", "check", "--json"]);
        assert_eq!(cli.config, PathBuf::from("app.toml"));
        assert!(matches!(cli.command, Some(Commands::Check { json: true })));

        let cli = Cli::parse_from(["cassandra-pooling"]);
        assert_eq!(cli.config, PathBuf::from("cassandra.toml"));
        assert!(cli.command.is_none());
    }
}
