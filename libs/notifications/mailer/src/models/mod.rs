use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A syntactically valid email address
///
/// Only constructed through [`crate::validation`], so holding one means
/// the address passed the permissive `local@domain.tld` check.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub(crate) fn new_unchecked(address: String) -> Self {
        Self(address)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Join addresses into a comma-separated header value
pub fn join_addresses(addresses: &[EmailAddress]) -> String {
    addresses
        .iter()
        .map(EmailAddress::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Provider-agnostic message description
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub from: EmailAddress,
    /// Never empty once assembled
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub subject: String,
    /// Plain text body
    pub text_body: Option<String>,
    /// HTML body, primary representation when present
    pub html_body: Option<String>,
    pub reply_to: Option<EmailAddress>,
    pub custom_headers: BTreeMap<String, String>,
    /// Absolute paths in discovery order
    pub attachments: Vec<PathBuf>,
}

/// Result of a successful provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResult {
    /// Provider-specific message ID, when the provider reported one
    pub message_id: Option<String>,
}

impl SendResult {
    pub fn new(message_id: Option<String>) -> Self {
        Self { message_id }
    }

    /// Message ID as reported to the host, `"unknown"` when missing
    pub fn message_id_or_unknown(&self) -> &str {
        self.message_id.as_deref().unwrap_or("unknown")
    }
}
