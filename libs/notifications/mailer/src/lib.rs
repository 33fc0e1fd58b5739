//! Email sending library for CI pipeline steps
//!
//! Turns step inputs into one validated message and hands it to SMTP or
//! AWS SES, with optional dry run and bounded retry.
//!
//! ## Components
//!
//! - **Inputs**: `ActionConfig` parsed from any `core_config::InputSource`
//! - **Validation**: address syntax, recipient lists, custom headers
//! - **Assembly**: `MailRequest` plus rendered template and attachments into a `Message`
//! - **Size guard**: per-provider ceilings (SMTP 25 MB, SES 10 MB)
//! - **Providers**: `SmtpProvider` (lettre), `SesProvider` (aws-sdk-sesv2), `RecordingProvider` for tests
//! - **Retry**: `RetryPolicy` with pure exponential backoff
//! - **Pipeline**: `Pipeline` ties it together and writes step outputs
//!
//! ## Usage
//!
//! ```ignore
//! use core_config::{EnvInputs, GithubOutput};
//! use mailer::{ActionConfig, DefaultProviderFactory, HandlebarsRenderer, Pipeline};
//!
//! let config = ActionConfig::from_inputs(&EnvInputs)?;
//! let outputs = GithubOutput::from_env();
//! let pipeline = Pipeline::new(&HandlebarsRenderer::new(), &DefaultProviderFactory, &outputs);
//! pipeline.run(&config).await?;
//! ```

pub mod assembler;
pub mod attachments;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod retry;
pub mod size;
pub mod templates;
pub mod validation;

// Re-export main types
pub use assembler::{MailRequest, assemble, parse_custom_headers};
pub use attachments::resolve_attachments;
pub use config::ActionConfig;
pub use error::{MailerError, MailerResult};
pub use models::{EmailAddress, Message, SendResult};
pub use pipeline::{Pipeline, RunOutcome};
pub use provider::{
    DefaultProviderFactory, EmailProvider, ProviderConfig, ProviderFactory, RecordingProvider,
    RecordingProviderFactory, SesConfig, SesProvider, SmtpConfig, SmtpProvider,
};
pub use retry::{RetryPolicy, retry};
pub use size::{SES_MAX_SIZE_MB, SMTP_MAX_SIZE_MB, enforce_limit, estimate_size};
pub use templates::{HandlebarsRenderer, TemplateRenderer};
pub use validation::{is_valid_address, parse_address_list};
