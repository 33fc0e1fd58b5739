//! AWS SES (Simple Email Service) provider
//!
//! Sends emails via the SES v2 `SendEmail` API with simple content.
//!
//! ## Limitations
//!
//! - Simple content cannot carry attachments; they are dropped with a
//!   warning (use the SMTP provider to send files)
//! - Custom headers cannot be transmitted; they are logged and dropped
//!   with a warning
//! - A text part is always supplied, derived from the HTML body when no
//!   plain-text body was given

use crate::error::{MailerError, MailerResult};
use crate::models::{EmailAddress, Message, join_addresses};
use crate::provider::{EmailProvider, SendResult};
use crate::size::{SES_MAX_SIZE_MB, as_megabytes, enforce_limit, estimate_size};
use async_trait::async_trait;
use aws_sdk_sesv2::Client;
use aws_sdk_sesv2::config::timeout::TimeoutConfig;
use aws_sdk_sesv2::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_sesv2::error::DisplayErrorContext;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message as SesMessage};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, error, info, warn};

static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// SES provider configuration
#[derive(Clone)]
pub struct SesConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Per-request timeout, `None` to wait indefinitely
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for SesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// AWS SES email provider
pub struct SesProvider {
    client: Client,
}

impl SesProvider {
    /// Create with explicit credentials and region
    pub fn new(config: SesConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None, // session token
            None, // expiry
            "action-inputs",
        );

        let mut builder = aws_sdk_sesv2::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout_config(
                TimeoutConfig::builder()
                    .operation_timeout(timeout)
                    .build(),
            );
        }

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

/// Remove angle-bracket-delimited tags
pub fn strip_tags(html: &str) -> String {
    HTML_TAG.replace_all(html, "").into_owned()
}

fn utf8_content(data: &str) -> MailerResult<Content> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| MailerError::Compose(e.to_string()))
}

fn addresses(list: &[EmailAddress]) -> Vec<String> {
    list.iter().map(|a| a.as_str().to_string()).collect()
}

/// Destination and simple content for a message
fn build_request_parts(message: &Message) -> MailerResult<(Destination, EmailContent)> {
    let mut destination = Destination::builder().set_to_addresses(Some(addresses(&message.to)));
    if !message.cc.is_empty() {
        destination = destination.set_cc_addresses(Some(addresses(&message.cc)));
    }
    if !message.bcc.is_empty() {
        destination = destination.set_bcc_addresses(Some(addresses(&message.bcc)));
    }

    let text = match (&message.text_body, &message.html_body) {
        (Some(text), _) => text.clone(),
        (None, Some(html)) => strip_tags(html),
        (None, None) => String::new(),
    };

    let mut body = Body::builder().text(utf8_content(&text)?);
    if let Some(html) = &message.html_body {
        body = body.html(utf8_content(html)?);
    }

    let simple = SesMessage::builder()
        .subject(utf8_content(&message.subject)?)
        .body(body.build())
        .build();

    Ok((
        destination.build(),
        EmailContent::builder().simple(simple).build(),
    ))
}

/// Warn about the parts of a message SES simple content cannot carry
fn warn_dropped_parts(message: &Message) {
    if !message.attachments.is_empty() {
        warn!(
            count = message.attachments.len(),
            "AWS SES does not support attachments in simple sends. \
             Attachments will be ignored; use the SMTP provider to send files"
        );
    }

    if !message.custom_headers.is_empty() {
        for (name, value) in &message.custom_headers {
            info!(header = %name, value = %value, "Custom header not sent via AWS SES");
        }
        warn!(
            count = message.custom_headers.len(),
            "Custom headers are not supported by AWS SES simple sends and were not sent"
        );
    }
}

#[async_trait]
impl EmailProvider for SesProvider {
    async fn send(&self, message: &Message) -> MailerResult<SendResult> {
        warn_dropped_parts(message);

        let (destination, content) = build_request_parts(message)?;

        let size = estimate_size(message, false);
        debug!(size_mb = format!("{:.2}", as_megabytes(size)), "Email size");
        enforce_limit(size, SES_MAX_SIZE_MB)?;

        debug!(
            to = %join_addresses(&message.to),
            subject = %message.subject,
            from = %message.from,
            "Sending email via AWS SES"
        );

        let mut request = self
            .client
            .send_email()
            .from_email_address(message.from.as_str())
            .destination(destination)
            .content(content);

        if let Some(reply_to) = &message.reply_to {
            request = request.reply_to_addresses(reply_to.as_str());
        }

        let response = request.send().await.map_err(|e| {
            let details = DisplayErrorContext(&e).to_string();
            error!(error = %details, "AWS SES send failed");
            MailerError::ProviderSend(format!("SES error: {}", details))
        })?;

        let message_id = response.message_id().map(str::to_string);

        info!(
            to = %join_addresses(&message.to),
            subject = %message.subject,
            message_id = message_id.as_deref().unwrap_or("unknown"),
            "Email sent via AWS SES"
        );

        Ok(SendResult::new(message_id))
    }

    fn name(&self) -> &'static str {
        "aws-ses"
    }
}
