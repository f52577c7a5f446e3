//! Worker environment serialization

pub mod serialize;
pub mod vars;

pub use serialize::{serialize, Encoding, EnvMapping, Export, Gate, EXPORTS};
