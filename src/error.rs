//! Error types for launcher configuration resolution

use crate::config::Bound;
use crate::domain::{ArgField, ValueKind};

/// Errors raised while resolving or validating launcher parameters.
///
/// All variants are terminal for the current resolution attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A config value names something that is not supported (e.g. an unknown controller)
    #[error("No such {key} supported: {value}")]
    InvalidValue { key: &'static str, value: String },

    /// A numeric field lies outside its permitted range
    #[error("{field}={value} must be {bound}")]
    OutOfRange { field: ArgField, value: String, bound: Bound },

    /// A config value cannot be stored in the field it maps to
    #[error("{field} expects {expected} but config provides {found}")]
    TypeMismatch { field: ArgField, expected: ValueKind, found: ValueKind },

    /// A parameter name does not match any recognized field
    #[error("Unknown parameter: {0}")]
    UnknownField(String),
}
