//! Recording email provider for tests and local dry wiring

use super::{EmailProvider, ProviderConfig, ProviderFactory, SendResult};
use crate::error::{MailerError, MailerResult};
use crate::models::Message;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, PoisonError};
use tokio::sync::Mutex;

/// Provider that records sent messages and can fail on demand
///
/// Clones share the same record, so a clone handed to the pipeline can be
/// inspected afterwards.
#[derive(Clone)]
pub struct RecordingProvider {
    sent: Arc<Mutex<Vec<Message>>>,
    calls: Arc<AtomicU32>,
    failures_left: Arc<AtomicU32>,
    failure_message: String,
    message_id: Option<String>,
}

impl RecordingProvider {
    /// Create a provider that always succeeds
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicU32::new(0)),
            failures_left: Arc::new(AtomicU32::new(0)),
            failure_message: "Recorded failure".to_string(),
            message_id: Some("recorded-message-id".to_string()),
        }
    }

    /// Fail the first `times` calls with a send failure
    pub fn failing_times(mut self, times: u32, message: impl Into<String>) -> Self {
        self.failures_left = Arc::new(AtomicU32::new(times));
        self.failure_message = message.into();
        self
    }

    /// Fail every call
    pub fn always_failing(self, message: impl Into<String>) -> Self {
        self.failing_times(u32::MAX, message)
    }

    /// Message ID returned on success, `None` to report no identifier
    pub fn with_message_id(mut self, message_id: Option<&str>) -> Self {
        self.message_id = message_id.map(str::to_string);
        self
    }

    /// Number of `send` invocations, successful or not
    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Messages that were accepted
    pub async fn sent_messages(&self) -> Vec<Message> {
        self.sent.lock().await.clone()
    }
}

impl Default for RecordingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    async fn send(&self, message: &Message) -> MailerResult<SendResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(MailerError::ProviderSend(self.failure_message.clone()));
        }

        self.sent.lock().await.push(message.clone());
        Ok(SendResult::new(self.message_id.clone()))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Factory handing out clones of one recording provider
#[derive(Clone, Default)]
pub struct RecordingProviderFactory {
    provider: RecordingProvider,
    built: Arc<std::sync::Mutex<Vec<&'static str>>>,
}

impl RecordingProviderFactory {
    pub fn new(provider: RecordingProvider) -> Self {
        Self {
            provider,
            built: Arc::default(),
        }
    }

    pub fn provider(&self) -> &RecordingProvider {
        &self.provider
    }

    /// Names of the provider configs requested so far
    pub fn built_for(&self) -> Vec<&'static str> {
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ProviderFactory for RecordingProviderFactory {
    fn build(&self, config: &ProviderConfig) -> MailerResult<Box<dyn EmailProvider>> {
        self.built
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(config.name());
        Ok(Box::new(self.provider.clone()))
    }
}
