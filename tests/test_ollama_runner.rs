//! Drives `OllamaRunner` against stand-in shell scripts.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use trendart::prompt::{ModelRunner, OllamaRunner, RunnerError};

fn write_script(path: &Path, body: &str) {
    std::fs::write(path, format!("#!/bin/sh\n{body}\n")).expect("write script");
    let mut perms = std::fs::metadata(path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).expect("chmod");
}

// One test so no other thread forks while a script is open for writing.
#[tokio::test]
async fn runner_passes_arguments_and_reports_exit_status() {
    let dir = tempfile::tempdir().expect("tempdir");

    let echo = dir.path().join("fake-ollama");
    write_script(
        &echo,
        r#"[ "$1" = "run" ] || exit 9
printf 'Prompt: %s painting\nTitle: %s\n' "$2" "Echoed"
"#,
    );
    let runner = OllamaRunner::new(echo.to_string_lossy(), "mistral");
    let output = runner.run("instruction text").await.expect("run");
    assert_eq!(output, "Prompt: mistral painting\nTitle: Echoed\n");

    let failing = dir.path().join("failing-ollama");
    write_script(&failing, "echo 'model missing' >&2\nexit 3");
    let runner = OllamaRunner::new(failing.to_string_lossy(), "mistral");
    match runner.run("instruction text").await {
        Err(RunnerError::Failed { status, stderr }) => {
            assert!(status.contains('3'), "status was {status}");
            assert_eq!(stderr.trim(), "model missing");
        }
        other => panic!("expected a failed run, got {other:?}"),
    }

    let missing = OllamaRunner::new(dir.path().join("absent").to_string_lossy(), "mistral");
    let err = missing.run("instruction text").await.expect_err("should fail");
    assert!(err.is_retryable());
}
