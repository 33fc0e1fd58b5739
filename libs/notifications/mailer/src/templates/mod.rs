//! HTML body templating with Handlebars
//!
//! This module provides:
//! - `TemplateRenderer`: the rendering capability used by the pipeline
//! - `HandlebarsRenderer`: Handlebars-based implementation
//! - `template_context`: caller variables merged with the run defaults

use crate::error::{MailerError, MailerResult};
use chrono::{DateTime, SecondsFormat, Utc};
use handlebars::Handlebars;
use serde_json::{Map, Value};

/// Renders template source against a JSON context
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, template: &str, variables: &Value) -> MailerResult<String>;
}

/// Handlebars-based template renderer
///
/// Supports:
/// - Variables: `{{name}}`
/// - Conditionals: `{{#if condition}}...{{/if}}`
/// - Loops: `{{#each items}}...{{/each}}`
/// - HTML escaping: `{{{unescaped}}}` for raw HTML
pub struct HandlebarsRenderer {
    handlebars: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        Self { handlebars }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template: &str, variables: &Value) -> MailerResult<String> {
        self.handlebars
            .render_template(template, variables)
            .map_err(|e| MailerError::TemplateRender(e.to_string()))
    }
}

/// Parse the `template-variables` input into a JSON object
pub fn parse_template_variables(raw: Option<&str>) -> MailerResult<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(MailerError::invalid_json(
            "template-variables",
            serde::de::Error::custom("expected a JSON object"),
        )),
        Err(e) => Err(MailerError::invalid_json("template-variables", e)),
    }
}

/// Build the render context: caller variables first, then `date` and
/// `timestamp`
///
/// The defaults are inserted last, so a caller-supplied `date` or
/// `timestamp` is replaced by the render-time value.
pub fn template_context(mut variables: Map<String, Value>, now: DateTime<Utc>) -> Value {
    variables.insert(
        "date".to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    variables.insert(
        "timestamp".to_string(),
        Value::Number(now.timestamp_millis().into()),
    );
    Value::Object(variables)
}
