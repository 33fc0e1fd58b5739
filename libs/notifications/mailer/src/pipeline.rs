//! Send pipeline
//!
//! ```text
//! ActionConfig
//!   ↓ validate addresses, select provider
//! MailRequest + ProviderConfig
//!   ↓ parse custom-headers and template-variables
//!   ↓ render template, resolve attachments
//! Message
//!   ├─ dry run: size check → outputs (dry-run, success)
//!   └─ send: ProviderFactory → retry(EmailProvider::send) → outputs (message-id, success)
//! ```

use crate::assembler::{MailRequest, assemble, parse_custom_headers};
use crate::attachments::resolve_attachments;
use crate::config::ActionConfig;
use crate::error::{MailerError, MailerResult};
use crate::models::{Message, join_addresses};
use crate::provider::{ProviderConfig, ProviderFactory};
use crate::retry::retry;
use crate::size::{as_megabytes, enforce_limit, estimate_size};
use crate::templates::{TemplateRenderer, parse_template_variables, template_context};
use chrono::Utc;
use core_config::OutputSink;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, instrument};

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Validated and size-checked, nothing sent
    DryRun { size_bytes: u64 },
    /// Delivered to the provider
    Sent { message_id: String },
}

/// Orchestrates one send
pub struct Pipeline<'a> {
    renderer: &'a dyn TemplateRenderer,
    providers: &'a dyn ProviderFactory,
    outputs: &'a dyn OutputSink,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        renderer: &'a dyn TemplateRenderer,
        providers: &'a dyn ProviderFactory,
        outputs: &'a dyn OutputSink,
    ) -> Self {
        Self {
            renderer,
            providers,
            outputs,
        }
    }

    /// Run the pipeline for `config`
    ///
    /// Any error ends the run; the caller reports it and exits non-zero.
    #[instrument(skip_all, fields(dry_run = config.dry_run))]
    pub async fn run(&self, config: &ActionConfig) -> MailerResult<RunOutcome> {
        let request = MailRequest::from_config(config)?;
        let provider_config = config.select_provider()?;
        debug!(provider = provider_config.name(), "Provider selected");

        let custom_headers = parse_custom_headers(config.custom_headers.as_deref())?;
        let variables = parse_template_variables(config.template_variables.as_deref())?;

        let rendered_html = match &config.html_template {
            Some(path) => Some(self.render_template(path, variables).await?),
            None => None,
        };

        let attachments = match &config.attachments {
            Some(patterns) => resolve_attachments(patterns),
            None => Vec::new(),
        };
        if !attachments.is_empty() {
            info!(count = attachments.len(), "Found attachment file(s)");
        }

        let message = assemble(&request, custom_headers, rendered_html, attachments);
        debug!(message = ?message, "Message assembled");

        if config.dry_run {
            return self.dry_run(&provider_config, &message);
        }

        self.send(config, &provider_config, &message).await
    }

    async fn render_template(
        &self,
        path: &Path,
        variables: Map<String, Value>,
    ) -> MailerResult<String> {
        let template = read_template(path).await?;
        let context = template_context(variables, Utc::now());
        debug!(template = %path.display(), context = %context, "Rendering template");

        let html = self.renderer.render(&template, &context)?;
        info!(template = %path.display(), "Template rendered");
        Ok(html)
    }

    fn dry_run(
        &self,
        provider_config: &ProviderConfig,
        message: &Message,
    ) -> MailerResult<RunOutcome> {
        let size = estimate_size(message, provider_config.counts_attachments());
        enforce_limit(size, provider_config.max_size_mb())?;

        info!("DRY RUN MODE - Email will not be sent");
        info!("Provider: {}", provider_config.name());
        info!("From: {}", message.from);
        info!("To: {}", join_addresses(&message.to));
        if !message.cc.is_empty() {
            info!("CC: {}", join_addresses(&message.cc));
        }
        if !message.bcc.is_empty() {
            info!("BCC: {} recipient(s)", message.bcc.len());
        }
        if let Some(reply_to) = &message.reply_to {
            info!("Reply-To: {}", reply_to);
        }
        info!("Subject: {}", message.subject);
        info!("Attachments: {}", message.attachments.len());
        info!("Email size: {:.2} MB", as_megabytes(size));

        self.outputs.set_output("dry-run", "true")?;
        self.outputs.set_output("success", "true")?;

        Ok(RunOutcome::DryRun { size_bytes: size })
    }

    async fn send(
        &self,
        config: &ActionConfig,
        provider_config: &ProviderConfig,
        message: &Message,
    ) -> MailerResult<RunOutcome> {
        let provider = self.providers.build(provider_config)?;
        let policy = config.retry_policy();
        info!(
            provider = provider.name(),
            attempts = policy.total_attempts(),
            "Sending email via {}",
            provider_config.name()
        );

        let result = retry(&policy, || provider.send(message)).await?;
        let message_id = result.message_id_or_unknown().to_string();

        info!("Email sent successfully");
        info!("To: {}", join_addresses(&message.to));
        if !message.cc.is_empty() {
            info!("CC: {}", join_addresses(&message.cc));
        }
        if !message.bcc.is_empty() {
            info!("BCC: {} recipient(s)", message.bcc.len());
        }
        if !message.attachments.is_empty() {
            info!("Attachments: {}", message.attachments.len());
        }
        info!("Message ID: {}", message_id);

        self.outputs.set_output("message-id", &message_id)?;
        self.outputs.set_output("success", "true")?;

        Ok(RunOutcome::Sent { message_id })
    }
}

async fn read_template(path: &Path) -> MailerResult<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        MailerError::TemplateRender(format!(
            "Failed to read template {}: {}",
            path.display(),
            e
        ))
    })
}
