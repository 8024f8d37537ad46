//! Configuration and startup

mod config;

pub use config::{Cli, Config};
