//! Connection pool settings, bound from configuration.

pub mod builder;
pub mod error;
pub mod host_distance;

pub use builder::PoolingOptionsBuilder;
pub use error::Error;
pub use host_distance::HostDistanceOptions;
