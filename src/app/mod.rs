//! Application glue module
//!
//! Configuration for the pager.

mod config;

pub use config::{Config, ConfigError};
