//! Launcher configuration resolution and worker environment serialization.
//!
//! Parameters are resolved from three layers (command-line overrides, a
//! structured config file, built-in defaults), validated, and projected into
//! the `HOROVOD_*` environment variables read by worker processes.

pub mod cli;
pub mod config;
pub mod domain;
pub mod env;
pub mod error;

pub use config::{load_config, resolve, validate};
pub use domain::{ArgField, LaunchArgs, OverrideSet, StructuredConfig, Value};
pub use env::{serialize, EnvMapping};
pub use error::ConfigError;
