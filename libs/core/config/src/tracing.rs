use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Install color-eyre with a project-standard configuration.
///
/// Call this early in main() before any fallible operations to ensure
/// colored error output. Safe to call multiple times.
///
/// Configuration:
/// - Shows file:line where errors occur
/// - Hides environment variables (runner environments carry secrets)
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Log output settings for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogSettings {
    /// Emit `debug` level lines
    pub debug: bool,
    /// Emit JSON lines instead of human-readable ones
    pub json: bool,
}

impl LogSettings {
    /// Settings for the given debug flag; `LOG_FORMAT=json` selects JSON output
    pub fn from_debug_flag(debug: bool) -> Self {
        Self {
            debug,
            json: crate::env_or_default("LOG_FORMAT", "text").eq_ignore_ascii_case("json"),
        }
    }

    fn default_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "info"
        }
    }
}

/// Initialize tracing with an ErrorLayer for span capture.
///
/// - `RUST_LOG` overrides the level; otherwise `info`, or `debug` when
///   the run's debug flag is set
/// - Human-readable compact lines by default, JSON with `LOG_FORMAT=json`
///
/// Safe to call multiple times; later calls are ignored (common in tests).
pub fn init_tracing(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.default_directive()));

    let result = if settings.json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .without_time()
                    .compact(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!(debug = settings.debug, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}
