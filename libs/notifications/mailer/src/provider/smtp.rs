//! SMTP email provider using lettre
//!
//! The relay certificate check is relaxed by default so self-signed
//! relays work out of the box. Set `verify_certificates` (the
//! `smtp-tls-verify` input) to enforce certificate validation.

use super::{EmailProvider, SendResult};
use crate::error::{MailerError, MailerResult};
use crate::models::{Message, join_addresses};
use crate::size::{SMTP_MAX_SIZE_MB, as_megabytes, enforce_limit, estimate_size};
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
    message::{
        Attachment, Mailbox, Mailboxes, MultiPart, SinglePart,
        header::{self, ContentType, HeaderName, HeaderValue},
    },
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

pub const DEFAULT_SMTP_PORT: u16 = 465;

/// SMTP provider configuration
#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, opportunistic STARTTLS otherwise
    pub secure: bool,
    pub username: String,
    pub password: String,
    /// Validate the relay certificate chain and hostname
    pub verify_certificates: bool,
    /// Connection and command timeout, `None` to wait indefinitely
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("username", &self.username)
            .field("password", &"***")
            .field("verify_certificates", &self.verify_certificates)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// SMTP email provider
pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

/// Message body before attachments are mixed in
enum BodyPart {
    Single(SinglePart),
    Multi(MultiPart),
}

impl SmtpProvider {
    /// Create a new SMTP provider
    pub fn new(config: SmtpConfig) -> MailerResult<Self> {
        let tls_parameters = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(!config.verify_certificates)
            .build()
            .map_err(|e| MailerError::Connection {
                host: config.host.clone(),
                port: config.port,
                details: format!("TLS configuration error: {}", e),
            })?;

        let tls = if config.secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls)
            .credentials(creds)
            .timeout(config.timeout)
            .build();

        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    /// Round-trip handshake with the relay
    async fn verify(&self) -> MailerResult<()> {
        let details = match self.transport.test_connection().await {
            Ok(true) => {
                debug!(host = %self.config.host, port = self.config.port, "SMTP connection verified");
                return Ok(());
            }
            Ok(false) => "server did not accept the connection".to_string(),
            Err(e) => e.to_string(),
        };

        let err = MailerError::Connection {
            host: self.config.host.clone(),
            port: self.config.port,
            details,
        };
        error!(
            host = %self.config.host,
            port = self.config.port,
            secure = self.config.secure,
            error = %err,
            "SMTP connection verification failed"
        );
        Err(err)
    }

    async fn build_message(&self, message: &Message) -> MailerResult<lettre::Message> {
        let from: Mailbox = message
            .from
            .as_str()
            .parse()
            .map_err(|e| MailerError::Compose(format!("Invalid from address: {}", e)))?;

        let mut builder = lettre::Message::builder()
            .from(from)
            .subject(message.subject.as_str())
            .message_id(None);

        builder = builder.header(header::To::from(parse_mailboxes(&message.to, "to")?));
        if !message.cc.is_empty() {
            builder = builder.header(header::Cc::from(parse_mailboxes(&message.cc, "cc")?));
        }
        if !message.bcc.is_empty() {
            builder = builder.header(header::Bcc::from(parse_mailboxes(&message.bcc, "bcc")?));
        }

        if let Some(reply_to) = &message.reply_to {
            let mailbox: Mailbox = reply_to
                .as_str()
                .parse()
                .map_err(|e| MailerError::Compose(format!("Invalid reply-to address: {}", e)))?;
            builder = builder.reply_to(mailbox);
        }

        for (name, value) in &message.custom_headers {
            let header_name = HeaderName::new_from_ascii(name.clone())
                .map_err(|_| MailerError::Compose(format!("Invalid header name: {}", name)))?;
            builder = builder.raw_header(HeaderValue::new(header_name, value.clone()));
        }

        let body = match (&message.html_body, &message.text_body) {
            (Some(html), Some(text)) => {
                BodyPart::Multi(MultiPart::alternative_plain_html(text.clone(), html.clone()))
            }
            (Some(html), None) => BodyPart::Single(SinglePart::html(html.clone())),
            (None, text) => BodyPart::Single(SinglePart::plain(text.clone().unwrap_or_default())),
        };

        let built = if message.attachments.is_empty() {
            match body {
                BodyPart::Single(part) => builder.singlepart(part),
                BodyPart::Multi(part) => builder.multipart(part),
            }
        } else {
            let mut mixed = match body {
                BodyPart::Single(part) => MultiPart::mixed().singlepart(part),
                BodyPart::Multi(part) => MultiPart::mixed().multipart(part),
            };
            for path in &message.attachments {
                mixed = mixed.singlepart(attachment_part(path).await?);
            }
            builder.multipart(mixed)
        };

        built.map_err(|e| MailerError::Compose(e.to_string()))
    }
}

fn parse_mailboxes(
    addresses: &[crate::models::EmailAddress],
    field: &str,
) -> MailerResult<Mailboxes> {
    join_addresses(addresses)
        .parse()
        .map_err(|e| MailerError::Compose(format!("Invalid {} address list: {}", field, e)))
}

/// Attachment part named after the path's final segment
async fn attachment_part(path: &Path) -> MailerResult<SinglePart> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "attachment".to_string());

    let content = tokio::fs::read(path)
        .await
        .map_err(|source| MailerError::Attachment {
            path: path.to_path_buf(),
            source,
        })?;

    let content_type = ContentType::parse("application/octet-stream")
        .map_err(|e| MailerError::Compose(e.to_string()))?;

    Ok(Attachment::new(filename).body(content, content_type))
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, message: &Message) -> MailerResult<SendResult> {
        let size = estimate_size(message, true);
        debug!(size_mb = format!("{:.2}", as_megabytes(size)), "Email size");
        enforce_limit(size, SMTP_MAX_SIZE_MB)?;

        debug!(
            host = %self.config.host,
            port = self.config.port,
            secure = self.config.secure,
            verify_certificates = self.config.verify_certificates,
            "Connecting to SMTP server"
        );
        self.verify().await?;

        let email = self.build_message(message).await?;
        let header_id = email.headers().get_raw("Message-ID").map(str::to_string);

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| MailerError::ProviderSend(format!("Failed to send email via SMTP: {}", e)))?;

        let message_id = header_id.or_else(|| response.message().next().map(str::to_string));

        info!(
            to = %join_addresses(&message.to),
            subject = %message.subject,
            message_id = message_id.as_deref().unwrap_or("unknown"),
            "Email sent via SMTP"
        );

        Ok(SendResult::new(message_id))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
