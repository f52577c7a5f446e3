//! Configuration loading, resolution and validation
//!
//! Resolves launcher parameters from command-line overrides, a config file
//! and built-in defaults with precedence CLI > File > Defaults.

pub mod loader;
pub mod resolve;
pub mod validate;

pub use loader::load_config;
pub use resolve::{merge, resolve, select_controller, Binding, Merge, BINDINGS};
pub use validate::{check_field, validate, violations, Bound};
