pub mod inputs;
pub mod outputs;
pub mod tracing;

pub use inputs::{EnvInputs, InputSource, MapInputs};
pub use outputs::{set_failed, GithubOutput, MemoryOutputs, OutputSink};

use std::env;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    #[error("Failed to parse input '{key}': {details}")]
    ParseError { key: String, details: String },

    #[error("Invalid output '{name}': {details}")]
    InvalidOutput { name: String, details: String },

    #[error("Failed to write output '{name}': {source}")]
    OutputWrite {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Helper to load an environment variable with a default value
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
