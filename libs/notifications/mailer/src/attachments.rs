//! Glob-pattern attachment resolution.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Expand comma-separated glob patterns into absolute file paths
///
/// Paths keep discovery order across patterns and appear once each.
/// Invalid patterns and patterns that match nothing are logged and
/// skipped.
pub fn resolve_attachments(patterns: &str) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let entries = match glob::glob(pattern) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(pattern, error = %e, "Invalid attachment pattern, skipping");
                continue;
            }
        };

        let mut matched = 0usize;
        for entry in entries {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!(pattern, error = %e, "Could not read attachment match, skipping");
                    continue;
                }
            };

            if !path.is_file() {
                continue;
            }

            let path = absolutize(&path);
            matched += 1;
            if seen.insert(path.clone()) {
                debug!(path = %path.display(), "Attachment resolved");
                files.push(path);
            }
        }

        if matched == 0 {
            warn!(pattern, "No files found matching attachment pattern");
        }
    }

    files
}

fn absolutize(path: &Path) -> PathBuf {
    path.canonicalize()
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
