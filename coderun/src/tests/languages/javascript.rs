use super::*;
use crate::tests::fixtures::{
    code_samples::JS_HELLO, echo_samples::JS_ECHO, test_scenarios::JS_INFINITE_LOOP,
};

#[tokio::test]
async fn test_javascript_basic() {
    test_language_execution(Language::JavaScript, JS_HELLO, &["node"]).await
}

#[tokio::test]
async fn test_javascript_input() {
    test_language_stdin(Language::JavaScript, JS_ECHO, &["node"]).await
}

#[tokio::test]
async fn test_javascript_timeout() {
    test_language_timeout(Language::JavaScript, JS_INFINITE_LOOP, &["node"]).await
}

#[tokio::test]
async fn test_javascript_uncaught_exception() {
    if skip_if_not_available(&["node"]) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let result = service
        .execute(ExecutionRequest::new("throw new Error('kaput')", "js"))
        .await;

    assert_eq!(result.failure, Some(FailureKind::RuntimeFailure));
    assert!(result.error.contains("kaput"));
    assert_no_leftovers(root.path());
}
