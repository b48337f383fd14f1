use super::*;
use crate::tests::fixtures::{
    code_samples::C_HELLO,
    echo_samples::C_ECHO,
    test_scenarios::{C_INFINITE_LOOP, C_SYNTAX_ERROR},
};

#[tokio::test]
async fn test_c_basic() {
    test_language_execution(Language::C, C_HELLO, &["gcc"]).await
}

#[tokio::test]
async fn test_c_input() {
    test_language_stdin(Language::C, C_ECHO, &["gcc"]).await
}

#[tokio::test]
async fn test_c_timeout() {
    test_language_timeout(Language::C, C_INFINITE_LOOP, &["gcc"]).await
}

#[tokio::test]
async fn test_c_syntax_error() {
    test_language_compile_error(Language::C, C_SYNTAX_ERROR, &["gcc"]).await
}

#[tokio::test]
async fn test_c_compile_only() {
    if skip_if_not_available(&["gcc"]) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let ok = service
        .compile(C_HELLO.to_string(), "c".to_string())
        .await;
    assert_eq!(ok.status, ExecutionStatus::Success);
    assert_eq!(ok.message.as_deref(), Some("Compilation successful"));

    let broken = service
        .compile(C_SYNTAX_ERROR.to_string(), "c".to_string())
        .await;
    assert_eq!(broken.status, ExecutionStatus::Error);
    assert_eq!(broken.failure, Some(FailureKind::CompileFailure));
    assert!(broken.error.is_some_and(|e| !e.is_empty()));

    assert_no_leftovers(root.path());
}

#[tokio::test]
async fn test_c_crash_reports_signal() {
    if skip_if_not_available(&["gcc"]) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let code = "#include <signal.h>\nint main(void) { raise(SIGKILL); return 0; }";
    let result = service.execute(ExecutionRequest::new(code, "c")).await;

    assert_eq!(result.failure, Some(FailureKind::RuntimeFailure));
    assert_eq!(result.error, "Process terminated by signal SIGKILL");
    assert_no_leftovers(root.path());
}
