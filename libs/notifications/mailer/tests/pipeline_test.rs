//! End-to-end pipeline runs against recording providers

use core_config::{MapInputs, MemoryOutputs};
use mailer::{
    ActionConfig, DefaultProviderFactory, HandlebarsRenderer, MailerError, Pipeline,
    RecordingProvider, RecordingProviderFactory, RunOutcome,
};
use std::path::PathBuf;

fn smtp_inputs() -> MapInputs {
    MapInputs::new()
        .with("from-email", "a@x.com")
        .with("to-email", "b@x.com,c@x.com")
        .with("subject", "S")
        .with("body", "hi")
        .with("smtp-server", "smtp.x.com")
        .with("username", "u")
        .with("password", "p")
}

fn ses_inputs() -> MapInputs {
    MapInputs::new()
        .with("from-email", "a@x.com")
        .with("to-email", "b@x.com")
        .with("subject", "S")
        .with("body", "hi")
        .with("aws-region", "us-east-1")
        .with("username", "AKIAEXAMPLE")
        .with("password", "secret")
}

async fn run(
    inputs: &MapInputs,
    factory: &RecordingProviderFactory,
    outputs: &MemoryOutputs,
) -> Result<RunOutcome, MailerError> {
    let config = ActionConfig::from_inputs(inputs)?;
    let renderer = HandlebarsRenderer::new();
    Pipeline::new(&renderer, factory, outputs).run(&config).await
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[tokio::test]
async fn test_smtp_send_end_to_end() {
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let outcome = run(&smtp_inputs(), &factory, &outputs).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Sent {
            message_id: "recorded-message-id".to_string()
        }
    );
    assert_eq!(factory.built_for(), vec!["SMTP"]);
    assert_eq!(factory.provider().call_count(), 1);

    let sent = factory.provider().sent_messages().await;
    assert_eq!(sent.len(), 1);
    let to: Vec<&str> = sent[0].to.iter().map(|a| a.as_str()).collect();
    assert_eq!(to, vec!["b@x.com", "c@x.com"]);
    assert_eq!(sent[0].text_body.as_deref(), Some("hi"));
    assert!(sent[0].html_body.is_none());

    assert_eq!(
        outputs.entries(),
        vec![
            ("message-id".to_string(), "recorded-message-id".to_string()),
            ("success".to_string(), "true".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_dry_run_never_builds_or_sends() {
    for inputs in [smtp_inputs(), ses_inputs()] {
        let factory = RecordingProviderFactory::new(RecordingProvider::new());
        let outputs = MemoryOutputs::new();

        let outcome = run(&inputs.with("dry-run", "true"), &factory, &outputs)
            .await
            .unwrap();

        assert!(matches!(outcome, RunOutcome::DryRun { .. }));
        assert!(factory.built_for().is_empty());
        assert_eq!(factory.provider().call_count(), 0);
        assert_eq!(outputs.get("dry-run").as_deref(), Some("true"));
        assert_eq!(outputs.get("success").as_deref(), Some("true"));
        assert!(outputs.get("message-id").is_none());
    }
}

#[tokio::test]
async fn test_ses_selected_without_smtp_server() {
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    run(&ses_inputs(), &factory, &outputs).await.unwrap();

    assert_eq!(factory.built_for(), vec!["AWS SES"]);
}

#[tokio::test]
async fn test_missing_credentials_before_any_send() {
    let inputs = MapInputs::new()
        .with("from-email", "a@x.com")
        .with("to-email", "b@x.com")
        .with("subject", "S")
        .with("smtp-server", "smtp.x.com");
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let err = run(&inputs, &factory, &outputs).await.unwrap_err();

    assert!(matches!(
        err,
        MailerError::MissingCredentials { provider: "SMTP" }
    ));
    assert_eq!(factory.provider().call_count(), 0);
    assert!(outputs.entries().is_empty());
}

#[tokio::test]
async fn test_missing_provider() {
    let inputs = MapInputs::new()
        .with("from-email", "a@x.com")
        .with("to-email", "b@x.com")
        .with("subject", "S");
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let err = run(&inputs, &factory, &outputs).await.unwrap_err();

    assert!(matches!(err, MailerError::MissingProvider));
    assert_eq!(factory.provider().call_count(), 0);
}

#[tokio::test]
async fn test_empty_recipients() {
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let err = run(&smtp_inputs().with("to-email", " , "), &factory, &outputs)
        .await
        .unwrap_err();

    assert!(matches!(err, MailerError::EmptyRecipients { .. }));
    assert_eq!(factory.provider().call_count(), 0);
}

#[tokio::test]
async fn test_invalid_cc_address_names_field() {
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let err = run(
        &smtp_inputs().with("cc-email", "ok@x.com, broken"),
        &factory,
        &outputs,
    )
    .await
    .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("cc-email"));
    assert!(message.contains("broken"));
    assert_eq!(factory.provider().call_count(), 0);
}

#[tokio::test]
async fn test_invalid_custom_headers_fail_before_send() {
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let err = run(
        &smtp_inputs().with("custom-headers", "{invalid json}"),
        &factory,
        &outputs,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MailerError::InvalidJson { ref field, .. } if field == "custom-headers"));
    assert!(factory.built_for().is_empty());
    assert_eq!(factory.provider().call_count(), 0);
}

#[tokio::test]
async fn test_custom_headers_reach_the_provider() {
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    run(
        &smtp_inputs().with("custom-headers", r#"{"X-Custom-Header": "value"}"#),
        &factory,
        &outputs,
    )
    .await
    .unwrap();

    let sent = factory.provider().sent_messages().await;
    assert_eq!(sent[0].custom_headers["X-Custom-Header"], "value");
}

#[tokio::test]
async fn test_dry_run_size_exceeded_for_ses() {
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();
    let body = "x".repeat(11 * 1024 * 1024);

    let err = run(
        &ses_inputs().with("body", body).with("dry-run", "true"),
        &factory,
        &outputs,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MailerError::SizeExceeded { limit_mb: 10, .. }));
    assert!(err.to_string().contains("10 MB limit"));
    assert!(outputs.entries().is_empty());
}

#[tokio::test]
async fn test_ses_size_checked_before_network() {
    // Real SES adapter: the size guard rejects before any request is made
    let inputs = ses_inputs()
        .with("body", "x".repeat(11 * 1024 * 1024))
        .with("retry-count", "3")
        .with("retry-delay", "1");
    let config = ActionConfig::from_inputs(&inputs).unwrap();
    let outputs = MemoryOutputs::new();
    let renderer = HandlebarsRenderer::new();

    let err = Pipeline::new(&renderer, &DefaultProviderFactory, &outputs)
        .run(&config)
        .await
        .unwrap_err();

    assert!(matches!(err, MailerError::SizeExceeded { .. }));
    assert!(outputs.entries().is_empty());
}

#[tokio::test]
async fn test_smtp_size_checked_before_network() {
    // Nothing listens on port 1; a connection attempt would fail with Connection
    let inputs = smtp_inputs()
        .with("smtp-server", "127.0.0.1")
        .with("smtp-port", "1")
        .with("body", "x".repeat(26 * 1024 * 1024))
        .with("retry-count", "3")
        .with("retry-delay", "1")
        .with("send-timeout", "200");
    let config = ActionConfig::from_inputs(&inputs).unwrap();
    let outputs = MemoryOutputs::new();
    let renderer = HandlebarsRenderer::new();

    let err = Pipeline::new(&renderer, &DefaultProviderFactory, &outputs)
        .run(&config)
        .await
        .unwrap_err();

    assert!(matches!(err, MailerError::SizeExceeded { limit_mb: 25, .. }));
    assert!(outputs.entries().is_empty());
}

#[tokio::test]
async fn test_invalid_template_variables_without_template() {
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let err = run(
        &smtp_inputs().with("template-variables", "{not json"),
        &factory,
        &outputs,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MailerError::InvalidJson { ref field, .. } if field == "template-variables"));
    assert_eq!(factory.provider().call_count(), 0);
}

#[tokio::test]
async fn test_missing_credentials_reported_before_header_json() {
    let inputs = MapInputs::new()
        .with("from-email", "a@x.com")
        .with("to-email", "b@x.com")
        .with("subject", "S")
        .with("smtp-server", "smtp.x.com")
        .with("custom-headers", "{invalid json}");
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let err = run(&inputs, &factory, &outputs).await.unwrap_err();

    assert!(matches!(
        err,
        MailerError::MissingCredentials { provider: "SMTP" }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_from_transient_failures() {
    let provider = RecordingProvider::new().failing_times(2, "421 try again later");
    let factory = RecordingProviderFactory::new(provider);
    let outputs = MemoryOutputs::new();

    let inputs = smtp_inputs()
        .with("retry-count", "3")
        .with("retry-delay", "100");
    let outcome = run(&inputs, &factory, &outputs).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Sent { .. }));
    assert_eq!(factory.provider().call_count(), 3);
    assert_eq!(outputs.get("success").as_deref(), Some("true"));
}

#[tokio::test(start_paused = true)]
async fn test_retry_exhaustion_reports_last_error() {
    let provider = RecordingProvider::new().always_failing("550 rejected");
    let factory = RecordingProviderFactory::new(provider);
    let outputs = MemoryOutputs::new();

    let inputs = smtp_inputs()
        .with("retry-count", "3")
        .with("retry-delay", "100");
    let err = run(&inputs, &factory, &outputs).await.unwrap_err();

    assert_eq!(factory.provider().call_count(), 3);
    match &err {
        MailerError::RetryExhausted { attempts, source } => {
            assert_eq!(*attempts, 3);
            assert!(matches!(**source, MailerError::ProviderSend(ref m) if m == "550 rejected"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("550 rejected"));
    assert!(outputs.entries().is_empty());
}

#[tokio::test]
async fn test_single_attempt_without_retries() {
    for retry_count in ["0", "1"] {
        let provider = RecordingProvider::new().always_failing("boom");
        let factory = RecordingProviderFactory::new(provider);
        let outputs = MemoryOutputs::new();

        let inputs = smtp_inputs().with("retry-count", retry_count);
        let err = run(&inputs, &factory, &outputs).await.unwrap_err();

        assert_eq!(factory.provider().call_count(), 1);
        assert!(matches!(err, MailerError::ProviderSend(ref m) if m == "boom"));
    }
}

#[tokio::test]
async fn test_unknown_message_id() {
    let provider = RecordingProvider::new().with_message_id(None);
    let factory = RecordingProviderFactory::new(provider);
    let outputs = MemoryOutputs::new();

    run(&smtp_inputs(), &factory, &outputs).await.unwrap();

    assert_eq!(outputs.get("message-id").as_deref(), Some("unknown"));
}

#[tokio::test]
async fn test_template_rendered_into_html_body() {
    let template = temp_file(
        "report.hbs",
        "<h1>{{project}}</h1><p>{{status}}</p>{{#if date}}<small>dated</small>{{/if}}",
    );
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let inputs = smtp_inputs()
        .with("html-template", template.to_string_lossy())
        .with(
            "template-variables",
            r#"{"project": "crate", "status": "green"}"#,
        );
    run(&inputs, &factory, &outputs).await.unwrap();

    let sent = factory.provider().sent_messages().await;
    assert_eq!(
        sent[0].html_body.as_deref(),
        Some("<h1>crate</h1><p>green</p><small>dated</small>")
    );
    assert_eq!(sent[0].text_body.as_deref(), Some("hi"));
}

#[tokio::test]
async fn test_invalid_template_variables() {
    let template = temp_file("report.hbs", "<p>{{status}}</p>");
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let inputs = smtp_inputs()
        .with("html-template", template.to_string_lossy())
        .with("template-variables", "not json");
    let err = run(&inputs, &factory, &outputs).await.unwrap_err();

    assert!(matches!(err, MailerError::InvalidJson { ref field, .. } if field == "template-variables"));
    assert_eq!(factory.provider().call_count(), 0);
}

#[tokio::test]
async fn test_attachments_resolved_and_passed_through() {
    let report = temp_file("report.txt", "all green");
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let outputs = MemoryOutputs::new();

    let inputs = smtp_inputs().with(
        "attachments",
        format!("{}, does-not-exist/*.zip", report.display()),
    );
    run(&inputs, &factory, &outputs).await.unwrap();

    let sent = factory.provider().sent_messages().await;
    assert_eq!(sent[0].attachments.len(), 1);
    assert!(sent[0].attachments[0].ends_with("report.txt"));
}
