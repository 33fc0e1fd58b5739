//! Address syntax checks and comma-separated list parsing.
//!
//! The address pattern is deliberately permissive (`local@domain.tld`
//! without whitespace) and is not a full RFC 5322 parser.

use crate::error::{MailerError, MailerResult};
use crate::models::EmailAddress;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Check an already-trimmed address
pub fn is_valid_address(address: &str) -> bool {
    EMAIL_ADDRESS.is_match(address)
}

/// Split on `,`, trim each segment and drop empty ones
pub fn parse_address_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validate a single address for `field`
pub fn validate_address(address: &str, field: &str) -> MailerResult<EmailAddress> {
    let address = address.trim();
    if is_valid_address(address) {
        Ok(EmailAddress::new_unchecked(address.to_string()))
    } else {
        Err(MailerError::invalid_address(field, address))
    }
}

/// Validate every entry, failing on the first invalid one
pub fn validate_address_list(list: &[String], field: &str) -> MailerResult<Vec<EmailAddress>> {
    list.iter()
        .map(|address| validate_address(address, field))
        .collect()
}
