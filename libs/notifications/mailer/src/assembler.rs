//! Validated request and provider-agnostic message assembly.

use crate::config::ActionConfig;
use crate::error::{MailerError, MailerResult};
use crate::models::{EmailAddress, Message};
use crate::validation::{parse_address_list, validate_address, validate_address_list};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Addresses and text inputs after validation
#[derive(Debug, Clone)]
pub struct MailRequest {
    pub from: EmailAddress,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub reply_to: Option<EmailAddress>,
    pub subject: String,
    pub text_body: Option<String>,
}

impl MailRequest {
    /// Validate every address field
    pub fn from_config(config: &ActionConfig) -> MailerResult<Self> {
        let to = parse_address_list(&config.to_email);
        if to.is_empty() {
            return Err(MailerError::EmptyRecipients {
                field: "to-email".to_string(),
            });
        }

        let from = validate_address(&config.from_email, "from-email")?;
        let to = validate_address_list(&to, "to-email")?;
        let cc = optional_list(config.cc_email.as_deref(), "cc-email")?;
        let bcc = optional_list(config.bcc_email.as_deref(), "bcc-email")?;
        let reply_to = config
            .reply_to
            .as_deref()
            .map(|address| validate_address(address, "reply-to"))
            .transpose()?;

        Ok(Self {
            from,
            to,
            cc,
            bcc,
            reply_to,
            subject: config.subject.clone(),
            text_body: config.body.clone(),
        })
    }
}

fn optional_list(raw: Option<&str>, field: &str) -> MailerResult<Vec<EmailAddress>> {
    match raw {
        Some(raw) => validate_address_list(&parse_address_list(raw), field),
        None => Ok(Vec::new()),
    }
}

/// Parse the `custom-headers` JSON object
///
/// Non-string values are kept as their JSON text. Duplicate names keep
/// the last value.
pub fn parse_custom_headers(raw: Option<&str>) -> MailerResult<BTreeMap<String, String>> {
    let Some(raw) = raw else {
        return Ok(BTreeMap::new());
    };

    let map = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(MailerError::invalid_json(
                "custom-headers",
                serde::de::Error::custom("expected a JSON object"),
            ));
        }
        Err(e) => return Err(MailerError::invalid_json("custom-headers", e)),
    };

    Ok(map
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (name, value)
        })
        .collect())
}

/// Build the message from the validated request, the parsed headers, the
/// rendered HTML and the resolved attachment paths
pub fn assemble(
    request: &MailRequest,
    custom_headers: BTreeMap<String, String>,
    rendered_html: Option<String>,
    attachments: Vec<PathBuf>,
) -> Message {
    Message {
        from: request.from.clone(),
        to: request.to.clone(),
        cc: request.cc.clone(),
        bcc: request.bcc.clone(),
        subject: request.subject.clone(),
        text_body: request.text_body.clone(),
        html_body: rendered_html,
        reply_to: request.reply_to.clone(),
        custom_headers,
        attachments,
    }
}
