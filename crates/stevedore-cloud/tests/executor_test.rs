#![cfg(unix)]

use stevedore_cloud::executor::{RealExecutor, ShellExecutor, Streams};
use stevedore_cloud::shell::ShellError;
use stevedore_core::StderrPolicy;

fn sh(script: &str) -> Vec<String> {
    vec!["-c".to_owned(), script.to_owned()]
}

#[tokio::test]
async fn exec_captures_stdout() {
    let executor = RealExecutor::default();
    let output = executor.exec("sh", &sh("echo hello")).await.unwrap();

    assert_eq!(output.code, Some(0));
    assert_eq!(output.stdout, "hello\n");
    assert!(output.stderr.is_empty());
}

#[tokio::test]
async fn exec_non_zero_exit_fails() {
    let executor = RealExecutor::default();
    let result = executor.exec("sh", &sh("echo boom >&2; exit 3")).await;

    match result {
        Err(ShellError::CommandFailed { code, stderr, .. }) => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr, "boom\n");
        }
        other => panic!("expected CommandFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn exec_stderr_fails_under_strict_policy() {
    let executor = RealExecutor::new(StderrPolicy::Strict);
    let result = executor.exec("sh", &sh("echo ok; echo careful >&2")).await;

    assert!(matches!(result, Err(ShellError::StderrOutput { .. })));
}

#[tokio::test]
async fn exec_stderr_allowed_under_exit_code_policy() {
    let executor = RealExecutor::new(StderrPolicy::ExitCode);
    let output = executor
        .exec("sh", &sh("echo ok; echo careful >&2"))
        .await
        .unwrap();

    assert_eq!(output.stdout, "ok\n");
    assert_eq!(output.stderr, "careful\n");
}

#[tokio::test]
async fn exec_missing_program_fails_to_spawn() {
    let executor = RealExecutor::default();
    let result = executor
        .exec("stevedore-definitely-not-installed", &[])
        .await;

    assert!(matches!(result, Err(ShellError::Spawn { .. })));
}

#[tokio::test]
async fn exec_streaming_captures_while_forwarding() {
    let executor = RealExecutor::default();
    let output = executor
        .exec_streaming("sh", &sh("echo one; echo two"), Streams::STDOUT)
        .await
        .unwrap();

    assert_eq!(output.stdout, "one\ntwo\n");
}

#[tokio::test]
async fn exec_streaming_applies_stderr_policy() {
    let strict = RealExecutor::new(StderrPolicy::Strict)
        .exec_streaming("sh", &sh("echo progress >&2"), Streams::default())
        .await;
    assert!(matches!(strict, Err(ShellError::StderrOutput { .. })));

    let lenient = RealExecutor::new(StderrPolicy::ExitCode)
        .exec_streaming("sh", &sh("echo progress >&2"), Streams::default())
        .await
        .unwrap();
    assert_eq!(lenient.stderr, "progress\n");
}

#[tokio::test]
async fn exec_streaming_non_utf8_stdout_still_succeeds() {
    let executor = RealExecutor::new(StderrPolicy::ExitCode);
    let output = executor
        .exec_streaming("sh", &sh("printf 'Step 1/2 caf\\351\\n'; exit 0"), Streams::default())
        .await
        .unwrap();

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.starts_with("Step 1/2 caf"));
    assert!(output.stdout.contains('\u{FFFD}'));
}

#[tokio::test]
async fn exec_non_utf8_stdout_still_succeeds() {
    let executor = RealExecutor::default();
    let output = executor
        .exec("sh", &sh("printf 'caf\\351\\n'"))
        .await
        .unwrap();

    assert_eq!(output.stdout, "caf\u{FFFD}\n");
}

#[test]
fn which_resolves_sh() {
    let executor = RealExecutor::default();
    assert!(executor.which("sh").is_some());
    assert!(executor.which("stevedore-definitely-not-installed").is_none());
}
