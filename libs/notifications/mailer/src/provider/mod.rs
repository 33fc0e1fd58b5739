//! Email provider implementations

pub mod recording;
pub mod ses;
pub mod smtp;

pub use recording::{RecordingProvider, RecordingProviderFactory};
pub use ses::{SesConfig, SesProvider};
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::MailerResult;
use crate::models::{Message, SendResult};
use crate::size::{SES_MAX_SIZE_MB, SMTP_MAX_SIZE_MB};
use async_trait::async_trait;

/// Trait for email providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send a message, enforcing the provider's size ceiling first
    async fn send(&self, message: &Message) -> MailerResult<SendResult>;

    /// Get provider name
    fn name(&self) -> &'static str;
}

/// Selected provider with its connection settings
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Smtp(SmtpConfig),
    Ses(SesConfig),
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Smtp(_) => "SMTP",
            Self::Ses(_) => "AWS SES",
        }
    }

    /// Size ceiling in megabytes
    pub fn max_size_mb(&self) -> u64 {
        match self {
            Self::Smtp(_) => SMTP_MAX_SIZE_MB,
            Self::Ses(_) => SES_MAX_SIZE_MB,
        }
    }

    /// SES never transmits attachments, so they do not count toward its limit
    pub fn counts_attachments(&self) -> bool {
        matches!(self, Self::Smtp(_))
    }
}

/// Builds the provider for a run
pub trait ProviderFactory: Send + Sync {
    fn build(&self, config: &ProviderConfig) -> MailerResult<Box<dyn EmailProvider>>;
}

/// Builds the real SMTP and SES adapters
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProviderFactory;

impl ProviderFactory for DefaultProviderFactory {
    fn build(&self, config: &ProviderConfig) -> MailerResult<Box<dyn EmailProvider>> {
        Ok(match config {
            ProviderConfig::Smtp(smtp) => Box::new(SmtpProvider::new(smtp.clone())?),
            ProviderConfig::Ses(ses) => Box::new(SesProvider::new(ses.clone())),
        })
    }
}
