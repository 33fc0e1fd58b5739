//! Approximate wire size and per-provider ceilings.

use crate::error::{MailerError, MailerResult};
use crate::models::Message;
use tracing::warn;

/// SMTP relays generally accept up to 25 MB, attachments included
pub const SMTP_MAX_SIZE_MB: u64 = 25;

/// SES simple sends are capped at 10 MB and carry no attachments
pub const SES_MAX_SIZE_MB: u64 = 10;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// UTF-8 byte length of subject and bodies, plus on-disk attachment sizes
/// when `count_attachments` is set
///
/// Attachments whose size cannot be read are skipped with a warning.
pub fn estimate_size(message: &Message, count_attachments: bool) -> u64 {
    let mut size = message.subject.len() as u64;
    size += message.text_body.as_ref().map_or(0, |b| b.len() as u64);
    size += message.html_body.as_ref().map_or(0, |b| b.len() as u64);

    if count_attachments {
        for path in &message.attachments {
            match std::fs::metadata(path) {
                Ok(meta) => size += meta.len(),
                Err(e) => warn!(
                    path = %path.display(),
                    error = %e,
                    "Could not read attachment size, skipping it in size estimate"
                ),
            }
        }
    }

    size
}

/// Fail when `size_bytes` exceeds `max_mb` megabytes
pub fn enforce_limit(size_bytes: u64, max_mb: u64) -> MailerResult<()> {
    if size_bytes > max_mb.saturating_mul(BYTES_PER_MB) {
        return Err(MailerError::size_exceeded(size_bytes, max_mb));
    }
    Ok(())
}

/// Megabytes for log lines
pub fn as_megabytes(size_bytes: u64) -> f64 {
    size_bytes as f64 / BYTES_PER_MB as f64
}
