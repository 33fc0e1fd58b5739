//! Named string inputs supplied by the hosting CI runner.
//!
//! Runners expose step inputs as environment variables named
//! `INPUT_<NAME>`, where the name is upper-cased and spaces become
//! underscores (hyphens are kept, so `from-email` is read from
//! `INPUT_FROM-EMAIL`).

use crate::ConfigError;
use std::collections::HashMap;
use std::env;

/// A source of named string inputs
pub trait InputSource: Send + Sync {
    /// Raw value for `name`, or `None` when the host did not supply it
    fn raw(&self, name: &str) -> Option<String>;

    /// Trimmed value, empty when absent
    fn get(&self, name: &str) -> String {
        self.raw(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    /// Trimmed value, or `None` when absent or blank
    fn optional(&self, name: &str) -> Option<String> {
        let value = self.get(name);
        (!value.is_empty()).then_some(value)
    }

    /// Trimmed value, failing when absent or blank
    fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::MissingInput(name.to_string()))
    }

    fn get_or(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    /// `"true"` is true, blank falls back to `default`, anything else is false
    fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.optional(name) {
            Some(value) => value == "true",
            None => default,
        }
    }

    /// Unsigned integer input, blank falls back to `default`
    fn get_number(&self, name: &str, default: u64) -> Result<u64, ConfigError> {
        match self.optional(name) {
            Some(value) => value.parse().map_err(|e| ConfigError::ParseError {
                key: name.to_string(),
                details: format!("{}", e),
            }),
            None => Ok(default),
        }
    }
}

/// Inputs read from `INPUT_*` environment variables
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvInputs;

impl EnvInputs {
    /// Environment variable name that carries the input `name`
    pub fn var_name(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }
}

impl InputSource for EnvInputs {
    fn raw(&self, name: &str) -> Option<String> {
        env::var(Self::var_name(name)).ok()
    }
}

/// In-memory inputs
#[derive(Debug, Clone, Default)]
pub struct MapInputs {
    values: HashMap<String, String>,
}

impl MapInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapInputs
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl InputSource for MapInputs {
    fn raw(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
