//! Step runs with in-memory inputs and a file-backed output sink

use action_mailer::run_with;
use core_config::{EnvInputs, GithubOutput, MapInputs, MemoryOutputs};
use mailer::{RecordingProvider, RecordingProviderFactory, RunOutcome};
use std::path::PathBuf;

fn inputs() -> MapInputs {
    MapInputs::new()
        .with("from-email", "ci@example.com")
        .with("to-email", "team@example.com")
        .with("subject", "Build finished")
        .with("body", "All green")
        .with("smtp-server", "smtp.example.com")
        .with("username", "ci")
        .with("password", "secret")
}

fn output_file() -> PathBuf {
    let dir = std::env::temp_dir().join(uuid::Uuid::new_v4().to_string());
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("github_output")
}

#[tokio::test]
async fn test_send_writes_outputs_file() {
    let path = output_file();
    let outputs = GithubOutput::to_file(&path);
    let factory = RecordingProviderFactory::new(RecordingProvider::new());

    let outcome = run_with(&inputs(), &outputs, &factory).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Sent { .. }));
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "message-id=recorded-message-id\nsuccess=true\n");
}

#[tokio::test]
async fn test_dry_run_writes_outputs_file() {
    let path = output_file();
    let outputs = GithubOutput::to_file(&path);
    let factory = RecordingProviderFactory::new(RecordingProvider::new());

    run_with(&inputs().with("dry-run", "true"), &outputs, &factory)
        .await
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, "dry-run=true\nsuccess=true\n");
    assert_eq!(factory.provider().call_count(), 0);
}

#[tokio::test]
async fn test_failure_report_carries_cause() {
    let outputs = MemoryOutputs::new();
    let factory =
        RecordingProviderFactory::new(RecordingProvider::new().always_failing("554 rejected"));

    let err = run_with(&inputs(), &outputs, &factory).await.unwrap_err();

    let report = format!("{err:#}");
    assert!(report.starts_with("Failed to send email"));
    assert!(report.contains("554 rejected"));
    assert!(outputs.entries().is_empty());
}

#[tokio::test]
async fn test_missing_required_input() {
    let outputs = MemoryOutputs::new();
    let factory = RecordingProviderFactory::new(RecordingProvider::new());
    let inputs = MapInputs::new().with("to-email", "team@example.com");

    let err = run_with(&inputs, &outputs, &factory).await.unwrap_err();

    let report = format!("{err:#}");
    assert!(report.starts_with("Invalid step inputs"));
    assert!(report.contains("from-email"));
}

#[tokio::test]
async fn test_env_inputs_drive_a_dry_run() {
    let vars = [
        ("INPUT_FROM-EMAIL", Some("ci@example.com")),
        ("INPUT_TO-EMAIL", Some("team@example.com")),
        ("INPUT_SUBJECT", Some("Build finished")),
        ("INPUT_AWS-REGION", Some("us-east-1")),
        ("INPUT_USERNAME", Some("AKIAEXAMPLE")),
        ("INPUT_PASSWORD", Some("secret")),
        ("INPUT_DRY-RUN", Some("true")),
    ];

    let outputs = MemoryOutputs::new();
    let factory = RecordingProviderFactory::new(RecordingProvider::new());

    let outcome = temp_env::async_with_vars(vars, run_with(&EnvInputs, &outputs, &factory))
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::DryRun { .. }));
    assert_eq!(outputs.get("dry-run").as_deref(), Some("true"));
}
