//! # coderun
//!
//! Runs short programs in C, C++, Java, Python and JavaScript: the source is
//! written into a per-job workspace, compiled if the language needs it, run
//! with the caller's stdin under a wall-clock timeout, and every file the job
//! created is removed afterwards.
//!
//! There is no OS-level sandboxing here. Only the timeout and an output cap
//! are enforced, so untrusted input needs isolation around this crate.

mod config;
mod error;
mod executor;
mod languages;
mod runner;
mod service;
mod types;
mod workspace;

#[cfg(test)]
mod tests;

pub use config::{ExecutorConfig, ToolchainConfig};
pub use error::Error;
pub use executor::CodeExecutor;
pub use languages::{derive_class_name, AdapterRegistry, JobPlan, LanguageAdapter};
pub use runner::{CommandSpec, Outcome, ProcessRunner, RawOutcome, Stage, Step};
pub use service::{CodeExecutionService, CodeRunner};
pub use types::{
    CompileResult, ExecutionRequest, ExecutionResult, ExecutionStatus, FailureKind, Language,
    LanguageStatus,
};
pub use workspace::{CleanupReport, Workspace, WorkspaceManager};

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;
