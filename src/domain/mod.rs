//! Core data types: launcher arguments, overrides and structured config

pub mod args;
pub mod structured;

pub use args::{ArgField, LaunchArgs, OverrideSet, Value, ValueKind};
pub use structured::{lookup, Entry, Group, Section, StructuredConfig};
