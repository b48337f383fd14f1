use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Error;

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Cpp,
    Java,
    Python,
    JavaScript,
}

impl Language {
    pub const ALL: [Language; 5] = [
        Language::C,
        Language::Cpp,
        Language::Java,
        Language::Python,
        Language::JavaScript,
    ];

    /// Canonical identifier, as accepted by callers and reported in results.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::Python => "python",
            Language::JavaScript => "javascript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "c" => Ok(Language::C),
            "cpp" | "c++" | "cxx" => Ok(Language::Cpp),
            "java" => Ok(Language::Java),
            "python" | "py" | "python3" => Ok(Language::Python),
            "javascript" | "js" | "node" => Ok(Language::JavaScript),
            _ => Err(Error::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// A single job as submitted by a caller.
///
/// `language` is kept as the caller's raw identifier; it is resolved against
/// the adapter registry before anything touches the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Source code to execute
    pub source_code: String,
    /// Language identifier, e.g. `python`, `c++`, `js`
    pub language: String,
    /// Data fed to the program's standard input
    #[serde(default)]
    pub stdin: String,
}

impl ExecutionRequest {
    pub fn new(source_code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            language: language.into(),
            stdin: String::new(),
        }
    }

    pub fn with_stdin(mut self, stdin: impl Into<String>) -> Self {
        self.stdin = stdin.into();
        self
    }
}

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Error,
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionStatus::Success => f.write_str("success"),
            ExecutionStatus::Error => f.write_str("error"),
        }
    }
}

/// Why a job ended with [`ExecutionStatus::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UnsupportedLanguage,
    InvalidRequest,
    CompileFailure,
    RuntimeFailure,
    Timeout,
    LaunchFailure,
    /// The host failed us (workspace could not be created, etc.)
    SystemError,
}

/// Execution result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub status: ExecutionStatus,
    /// Program output (stdout), empty unless the job succeeded
    pub output: String,
    /// Compiler/program stderr or a diagnostic, empty on success
    pub error: String,
    pub execution_time_millis: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Set when stdout or stderr hit the output cap
    #[serde(default)]
    pub truncated: bool,
}

impl ExecutionResult {
    pub fn success(output: String, elapsed: Duration, truncated: bool) -> Self {
        Self {
            status: ExecutionStatus::Success,
            output,
            error: String::new(),
            execution_time_millis: elapsed.as_millis() as u64,
            failure: None,
            truncated,
        }
    }

    pub fn failure(kind: FailureKind, error: String, elapsed: Duration, truncated: bool) -> Self {
        Self {
            status: ExecutionStatus::Error,
            output: String::new(),
            error,
            execution_time_millis: elapsed.as_millis() as u64,
            failure: Some(kind),
            truncated,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}

/// Result of a compile-only request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileResult {
    pub status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl CompileResult {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Success,
            error: None,
            message: Some(message.into()),
            failure: None,
        }
    }

    pub fn failure(kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            status: ExecutionStatus::Error,
            error: Some(error.into()),
            message: None,
            failure: Some(kind),
        }
    }
}

/// Whether the toolchains for a language are present on this host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageStatus {
    pub language: Language,
    pub available: bool,
    pub missing_tools: Vec<String>,
}
