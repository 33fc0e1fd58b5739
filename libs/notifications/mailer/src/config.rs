//! Typed view of the step inputs.

use crate::error::{MailerError, MailerResult};
use crate::provider::smtp::DEFAULT_SMTP_PORT;
use crate::provider::{ProviderConfig, SesConfig, SmtpConfig};
use crate::retry::RetryPolicy;
use core_config::{ConfigError, InputSource};
use std::path::PathBuf;
use std::time::Duration;

/// Default per-call timeout for provider requests
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 60_000;

/// Default base delay between retries
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Every recognized input, parsed but not yet validated
#[derive(Clone, Default)]
pub struct ActionConfig {
    pub from_email: String,
    /// Raw comma-separated list
    pub to_email: String,
    pub subject: String,
    pub body: Option<String>,
    pub html_template: Option<PathBuf>,
    /// Raw JSON object
    pub template_variables: Option<String>,
    /// Raw comma-separated glob patterns
    pub attachments: Option<String>,

    pub smtp_server: Option<String>,
    pub smtp_port: u16,
    pub smtp_secure: bool,
    pub smtp_tls_verify: bool,
    pub aws_region: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,

    pub cc_email: Option<String>,
    pub bcc_email: Option<String>,
    pub reply_to: Option<String>,
    /// Raw JSON object of header name to value
    pub custom_headers: Option<String>,

    pub dry_run: bool,
    pub debug: bool,
    pub retry_count: u32,
    pub retry_delay_ms: u64,
    /// 0 disables the timeout
    pub send_timeout_ms: u64,
}

impl std::fmt::Debug for ActionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionConfig")
            .field("from_email", &self.from_email)
            .field("to_email", &self.to_email)
            .field("subject", &self.subject)
            .field("html_template", &self.html_template)
            .field("attachments", &self.attachments)
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_secure", &self.smtp_secure)
            .field("smtp_tls_verify", &self.smtp_tls_verify)
            .field("aws_region", &self.aws_region)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("cc_email", &self.cc_email)
            .field("bcc_email", &self.bcc_email)
            .field("reply_to", &self.reply_to)
            .field("dry_run", &self.dry_run)
            .field("debug", &self.debug)
            .field("retry_count", &self.retry_count)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("send_timeout_ms", &self.send_timeout_ms)
            .finish_non_exhaustive()
    }
}

impl ActionConfig {
    /// Read every input from `inputs`
    ///
    /// `from-email` and `subject` are required. An empty `to-email` is
    /// left for validation to report.
    pub fn from_inputs(inputs: &dyn InputSource) -> MailerResult<Self> {
        let smtp_port = inputs.get_number("smtp-port", u64::from(DEFAULT_SMTP_PORT))?;
        let smtp_port = u16::try_from(smtp_port).map_err(|e| ConfigError::ParseError {
            key: "smtp-port".to_string(),
            details: e.to_string(),
        })?;

        let retry_count = inputs.get_number("retry-count", 0)?;
        let retry_count = u32::try_from(retry_count).map_err(|e| ConfigError::ParseError {
            key: "retry-count".to_string(),
            details: e.to_string(),
        })?;

        Ok(Self {
            from_email: inputs.required("from-email")?,
            to_email: inputs.get("to-email"),
            subject: inputs.required("subject")?,
            body: inputs.optional("body"),
            html_template: inputs.optional("html-template").map(PathBuf::from),
            template_variables: inputs.optional("template-variables"),
            attachments: inputs.optional("attachments"),
            smtp_server: inputs.optional("smtp-server"),
            smtp_port,
            smtp_secure: inputs.get_bool("smtp-secure", true),
            smtp_tls_verify: inputs.get_bool("smtp-tls-verify", false),
            aws_region: inputs.optional("aws-region"),
            username: inputs.optional("username"),
            password: inputs.optional("password"),
            cc_email: inputs.optional("cc-email"),
            bcc_email: inputs.optional("bcc-email"),
            reply_to: inputs.optional("reply-to"),
            custom_headers: inputs.optional("custom-headers"),
            dry_run: inputs.get_bool("dry-run", false),
            debug: inputs.get_bool("debug", false),
            retry_count,
            retry_delay_ms: inputs.get_number("retry-delay", DEFAULT_RETRY_DELAY_MS)?,
            send_timeout_ms: inputs.get_number("send-timeout", DEFAULT_SEND_TIMEOUT_MS)?,
        })
    }

    /// `retry-count` is the total number of send attempts
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.retry_count, self.retry_delay_ms)
    }

    pub fn send_timeout(&self) -> Option<Duration> {
        (self.send_timeout_ms > 0).then(|| Duration::from_millis(self.send_timeout_ms))
    }

    /// Pick the provider: SMTP when a server is set, else SES when a
    /// region is set. Credentials are required for either.
    pub fn select_provider(&self) -> MailerResult<ProviderConfig> {
        if let Some(host) = &self.smtp_server {
            let (username, password) = self.credentials("SMTP")?;
            return Ok(ProviderConfig::Smtp(SmtpConfig {
                host: host.clone(),
                port: self.smtp_port,
                secure: self.smtp_secure,
                username,
                password,
                verify_certificates: self.smtp_tls_verify,
                timeout: self.send_timeout(),
            }));
        }

        if let Some(region) = &self.aws_region {
            let (access_key_id, secret_access_key) = self.credentials("AWS SES")?;
            return Ok(ProviderConfig::Ses(SesConfig {
                region: region.clone(),
                access_key_id,
                secret_access_key,
                timeout: self.send_timeout(),
            }));
        }

        Err(MailerError::MissingProvider)
    }

    fn credentials(&self, provider: &'static str) -> MailerResult<(String, String)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok((username.clone(), password.clone())),
            _ => Err(MailerError::MissingCredentials { provider }),
        }
    }
}
