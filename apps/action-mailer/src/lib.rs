//! CI Email Step
//!
//! Sends one email per invocation from step inputs.
//!
//! ## Architecture
//!
//! ```text
//! INPUT_* environment variables
//!   ↓ (EnvInputs)
//! ActionConfig
//!   ↓
//! Pipeline (validate → render → assemble → size check)
//!   ↓ (DefaultProviderFactory)
//! SMTP relay / AWS SES
//!   ↓
//! $GITHUB_OUTPUT (message-id | dry-run, success)
//! ```

use core_config::tracing::{LogSettings, init_tracing};
use core_config::{EnvInputs, GithubOutput, InputSource, OutputSink};
use eyre::{Result, WrapErr};
use mailer::{
    ActionConfig, DefaultProviderFactory, HandlebarsRenderer, Pipeline, ProviderFactory, RunOutcome,
};
use tracing::{debug, info};

/// Run the step against the process environment
///
/// # Errors
///
/// Returns an error if:
/// - A required input is missing or malformed
/// - Any address, JSON input or template is invalid
/// - The message exceeds the provider's size limit
/// - The provider rejects the send after all retries
pub async fn run() -> Result<RunOutcome> {
    let outputs = GithubOutput::from_env();
    run_with(&EnvInputs, &outputs, &DefaultProviderFactory).await
}

/// Run the step with explicit collaborators
pub async fn run_with(
    inputs: &dyn InputSource,
    outputs: &dyn OutputSink,
    providers: &dyn ProviderFactory,
) -> Result<RunOutcome> {
    let config = ActionConfig::from_inputs(inputs).wrap_err("Invalid step inputs")?;

    init_tracing(&LogSettings::from_debug_flag(config.debug));
    debug!(config = ?config, "Inputs loaded");

    let renderer = HandlebarsRenderer::new();
    let outcome = Pipeline::new(&renderer, providers, outputs)
        .run(&config)
        .await
        .wrap_err("Failed to send email")?;

    match &outcome {
        RunOutcome::DryRun { .. } => info!("Dry run completed"),
        RunOutcome::Sent { message_id } => info!(message_id = %message_id, "Email delivered"),
    }

    Ok(outcome)
}
