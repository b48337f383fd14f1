use super::utils::{assertions::assert_no_leftovers, defaults::*};
use crate::{
    languages::skip_if_not_available, CodeRunner, ExecutionRequest, ExecutionStatus, FailureKind,
    Language,
};
use tempfile::tempdir;

pub mod c;
pub mod cpp;
pub mod java;
pub mod javascript;
pub mod python;

// Common test utilities for language tests
pub(crate) async fn test_language_execution(language: Language, code: &str, tools: &[&str]) {
    if skip_if_not_available(tools) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let result = service
        .execute(ExecutionRequest::new(code, language.as_str()))
        .await;

    assert_eq!(result.status, ExecutionStatus::Success, "{:?}", result);
    assert!(result.output.contains("Hello from"));
    assert!(result.error.is_empty());
    assert_no_leftovers(root.path());
}

pub(crate) async fn test_language_stdin(language: Language, code: &str, tools: &[&str]) {
    if skip_if_not_available(tools) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let request = ExecutionRequest::new(code, language.as_str()).with_stdin("test user\n");
    let result = service.execute(request).await;

    assert_eq!(result.status, ExecutionStatus::Success, "{:?}", result);
    assert_eq!(result.output.trim_end(), "test user");
    assert_no_leftovers(root.path());
}

pub(crate) async fn test_language_timeout(language: Language, code: &str, tools: &[&str]) {
    if skip_if_not_available(tools) {
        return;
    }
    let root = tempdir().unwrap();
    let service = short_timeout_service(root.path(), 1);

    let started = std::time::Instant::now();
    let result = service
        .execute(ExecutionRequest::new(code, language.as_str()))
        .await;

    assert_eq!(result.failure, Some(FailureKind::Timeout), "{:?}", result);
    assert!(result.error.contains("timed out"));
    assert!(result.output.is_empty());
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert_no_leftovers(root.path());
}

pub(crate) async fn test_language_compile_error(language: Language, code: &str, tools: &[&str]) {
    if skip_if_not_available(tools) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let result = service
        .execute(ExecutionRequest::new(code, language.as_str()))
        .await;

    assert_eq!(result.status, ExecutionStatus::Error);
    assert_eq!(result.failure, Some(FailureKind::CompileFailure));
    assert!(!result.error.is_empty());
    assert!(result.output.is_empty());
    assert_no_leftovers(root.path());
}
