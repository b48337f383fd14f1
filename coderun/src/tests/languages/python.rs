use super::*;
use crate::tests::fixtures::{
    code_samples::PYTHON_HELLO,
    echo_samples::PYTHON_ECHO,
    test_scenarios::{
        PYTHON_INFINITE_LOOP, PYTHON_LARGE_OUTPUT, PYTHON_SILENT_EXIT, PYTHON_STDERR_EXIT,
    },
};
use crate::{CodeExecutionService, ExecutorConfig};

#[tokio::test]
async fn test_python_basic() {
    test_language_execution(Language::Python, PYTHON_HELLO, &["python3"]).await
}

#[tokio::test]
async fn test_python_input() {
    test_language_stdin(Language::Python, PYTHON_ECHO, &["python3"]).await
}

#[tokio::test]
async fn test_python_timeout() {
    test_language_timeout(Language::Python, PYTHON_INFINITE_LOOP, &["python3"]).await
}

#[tokio::test]
async fn test_python_stderr_becomes_error() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let result = service
        .execute(ExecutionRequest::new(PYTHON_STDERR_EXIT, "python"))
        .await;

    assert_eq!(result.failure, Some(FailureKind::RuntimeFailure));
    assert_eq!(result.error, "boom\n");
    assert!(result.output.is_empty());
}

#[tokio::test]
async fn test_python_silent_exit_reports_status() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let result = service
        .execute(ExecutionRequest::new(PYTHON_SILENT_EXIT, "python3"))
        .await;

    assert_eq!(result.failure, Some(FailureKind::RuntimeFailure));
    assert!(result.error.starts_with("Process exited with status"));
    assert!(result.error.contains('3'));
}

#[tokio::test]
async fn test_python_output_is_capped() {
    if skip_if_not_available(&["python3"]) {
        return;
    }
    let root = tempdir().unwrap();
    let service = CodeExecutionService::new(ExecutorConfig {
        max_output_bytes: 1024,
        ..default_test_config(root.path())
    })
    .unwrap();

    let result = service
        .execute(ExecutionRequest::new(PYTHON_LARGE_OUTPUT, "python"))
        .await;

    assert!(result.is_success(), "{:?}", result);
    assert!(result.truncated);
    assert_eq!(result.output.len(), 1024);
    assert_no_leftovers(root.path());
}

#[tokio::test]
async fn test_python_compile_only_is_a_no_op() {
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let result = service
        .compile(PYTHON_HELLO.to_string(), "python".to_string())
        .await;

    assert_eq!(result.status, ExecutionStatus::Success);
    assert_eq!(
        result.message.as_deref(),
        Some("No compilation needed for interpreted languages")
    );
    assert_no_leftovers(root.path());
}
