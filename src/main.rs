//! Validate Cassandra connection pool settings.

use cassandra_pooling::cli::{self, Cli, Commands};
use cassandra_pooling::logger;

use clap::Parser;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    logger();

    info!("cassandra-pooling {}", env!("CARGO_PKG_VERSION"));

    let result = match args.command {
        Some(Commands::Defaults { json }) => cli::defaults(json),
        Some(Commands::Check { json }) => cli::check(&args.config, json),
        None => cli::check(&args.config, false),
    };

    if let Err(ref err) = result {
        error!("{}", err);
    }

    result
}
