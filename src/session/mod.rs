//! Client sessions built from configuration.

pub mod error;
pub mod factory;

pub use error::Error;
pub use factory::{cluster_settings, ManagedSession, SessionFactory};
