use super::*;
use crate::tests::fixtures::{
    code_samples::CPP_HELLO, echo_samples::CPP_ECHO, test_scenarios::CPP_SYNTAX_ERROR,
};

#[tokio::test]
async fn test_cpp_basic() {
    test_language_execution(Language::Cpp, CPP_HELLO, &["g++"]).await
}

#[tokio::test]
async fn test_cpp_input() {
    test_language_stdin(Language::Cpp, CPP_ECHO, &["g++"]).await
}

#[tokio::test]
async fn test_cpp_syntax_error() {
    test_language_compile_error(Language::Cpp, CPP_SYNTAX_ERROR, &["g++"]).await
}

#[tokio::test]
async fn test_cpp_synonym() {
    if skip_if_not_available(&["g++"]) {
        return;
    }
    let root = tempdir().unwrap();
    let service = setup_test_service(root.path());

    let result = service
        .execute(ExecutionRequest::new(CPP_HELLO, "C++"))
        .await;
    assert!(result.is_success(), "{:?}", result);
    assert_eq!(result.output, "Hello from C++!\n");
}
