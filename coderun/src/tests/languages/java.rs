use super::*;
use crate::tests::fixtures::{
    code_samples::JAVA_HELLO,
    echo_samples::JAVA_ECHO,
    test_scenarios::{JAVA_INFINITE_LOOP, JAVA_NESTED_CLASSES, JAVA_SYNTAX_ERROR},
};

const JAVA_TOOLS: &[&str] = &["javac", "java"];

#[tokio::test]
async fn test_java_basic() {
    test_language_execution(Language::Java, JAVA_HELLO, JAVA_TOOLS).await
}

#[tokio::test]
async fn test_java_input() {
    test_language_stdin(Language::Java, JAVA_ECHO, JAVA_TOOLS).await
}

#[tokio::test]
async fn test_java_syntax_error() {
    test_language_compile_error(Language::Java, JAVA_SYNTAX_ERROR, JAVA_TOOLS).await
}

#[tokio::test]
async fn test_java_timeout() {
    // The JVM needs a moment to start, give it room before the loop spins.
    if skip_if_not_available(JAVA_TOOLS) {
        return;
    }
    let root = tempdir().unwrap();
    let service = short_timeout_service(root.path(), 3);

    let result = service
        .execute(ExecutionRequest::new(JAVA_INFINITE_LOOP, "java"))
        .await;

    assert_eq!(result.failure, Some(FailureKind::Timeout), "{:?}", result);
    assert_no_leftovers(root.path());
}

#[tokio::test]
async fn test_java_nested_class_files_are_removed() {
    if skip_if_not_available(JAVA_TOOLS) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let result = service
        .execute(ExecutionRequest::new(JAVA_NESTED_CLASSES, "java"))
        .await;

    assert!(result.is_success(), "{:?}", result);
    assert_eq!(result.output, "Hello from Inner!\n");
    // Outer.class, Outer$Inner.class and Outer$1.class all came from javac.
    assert_no_leftovers(root.path());
}
