//! Key/value outputs reported back to the hosting CI runner.

use crate::ConfigError;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// A sink for step outputs
pub trait OutputSink: Send + Sync {
    fn set_output(&self, name: &str, value: &str) -> Result<(), ConfigError>;
}

/// Writes outputs to the file named by `GITHUB_OUTPUT`
///
/// Falls back to printing `name=value` on stdout when no output file is
/// configured (local runs).
#[derive(Debug, Clone, Default)]
pub struct GithubOutput {
    path: Option<PathBuf>,
}

impl GithubOutput {
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os("GITHUB_OUTPUT")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    fn format_entry(name: &str, value: &str) -> Result<String, ConfigError> {
        if !value.contains(['\n', '\r']) {
            return Ok(format!("{name}={value}\n"));
        }

        let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
        if name.contains(&delimiter) || value.contains(&delimiter) {
            return Err(ConfigError::InvalidOutput {
                name: name.to_string(),
                details: "value contains the heredoc delimiter".to_string(),
            });
        }
        Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
    }
}

impl OutputSink for GithubOutput {
    fn set_output(&self, name: &str, value: &str) -> Result<(), ConfigError> {
        let entry = Self::format_entry(name, value)?;

        match &self.path {
            Some(path) => OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(entry.as_bytes()))
                .map_err(|source| ConfigError::OutputWrite {
                    name: name.to_string(),
                    source,
                }),
            None => {
                print!("{}", entry);
                Ok(())
            }
        }
    }
}

/// Records outputs in memory
#[derive(Debug, Default)]
pub struct MemoryOutputs {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemoryOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// All outputs in the order they were set
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Last value set for `name`
    pub fn get(&self, name: &str) -> Option<String> {
        self.entries()
            .into_iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl OutputSink for MemoryOutputs {
    fn set_output(&self, name: &str, value: &str) -> Result<(), ConfigError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), value.to_string()));
        Ok(())
    }
}

/// Report a step failure to the runner as a single framed error line
pub fn set_failed(message: &str) {
    println!("::error::{}", escape_data(message));
}

/// Workflow-command data encoding: `%`, CR and LF are percent-escaped
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
