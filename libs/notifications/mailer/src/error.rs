//! Error types for the send pipeline.

use core_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for mailer operations.
pub type MailerResult<T> = Result<T, MailerError>;

/// Errors that can end a run.
#[derive(Error, Debug)]
pub enum MailerError {
    #[error("Invalid email address in {field}: {value}")]
    InvalidAddress { field: String, value: String },

    #[error("At least one recipient email is required in {field}")]
    EmptyRecipients { field: String },

    #[error("No email provider configured. Set either smtp-server or aws-region")]
    MissingProvider,

    #[error("{provider} requires username and password")]
    MissingCredentials { provider: &'static str },

    #[error("Invalid JSON in {field}: {source}")]
    InvalidJson {
        field: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Template rendering failed: {0}")]
    TemplateRender(String),

    #[error("Failed to compose message: {0}")]
    Compose(String),

    #[error("Failed to read attachment {}: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "SMTP connection to {host}:{port} failed: {details}. \
         Check that the server host and port are correct, the username and password are valid, \
         and that the network or firewall allows outbound connections to the relay"
    )]
    Connection {
        host: String,
        port: u16,
        details: String,
    },

    #[error("Email size ({size_mb:.2} MB) exceeds the {limit_mb} MB limit")]
    SizeExceeded {
        size_bytes: u64,
        size_mb: f64,
        limit_mb: u64,
    },

    #[error("Provider error: {0}")]
    ProviderSend(String),

    #[error("{source} (gave up after {attempts} attempts)")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<MailerError>,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MailerError {
    pub fn invalid_address(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidAddress {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn invalid_json(field: impl Into<String>, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            field: field.into(),
            source,
        }
    }

    pub fn size_exceeded(size_bytes: u64, limit_mb: u64) -> Self {
        Self::SizeExceeded {
            size_bytes,
            size_mb: size_bytes as f64 / (1024.0 * 1024.0),
            limit_mb,
        }
    }

    /// Transport failures are the only errors worth another attempt
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderSend(_) | Self::Connection { .. })
    }
}
