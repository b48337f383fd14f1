use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::{
    config::ExecutorConfig,
    error::Error,
    languages::{AdapterRegistry, LanguageAdapter},
    runner::{Outcome, ProcessRunner, RawOutcome, Stage},
    types::{CompileResult, ExecutionRequest, ExecutionResult, FailureKind},
    workspace::{Workspace, WorkspaceManager},
};

const NO_COMPILATION_NEEDED: &str = "No compilation needed for interpreted languages";
const COMPILATION_SUCCESSFUL: &str = "Compilation successful";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Execute,
    CompileOnly,
}

/// Runs one job end to end: validate, allocate a workspace, build the
/// commands, run them, release the workspace.
///
/// Every path returns a well-formed result; nothing here hands a raw error
/// back to the caller.
pub struct CodeExecutor {
    workspaces: WorkspaceManager,
    registry: AdapterRegistry,
    runner: ProcessRunner,
}

impl CodeExecutor {
    /// Create a new code executor
    pub fn new(config: &ExecutorConfig) -> Self {
        Self {
            workspaces: WorkspaceManager::new(&config.temp_root),
            registry: AdapterRegistry::new(&config.toolchains),
            runner: ProcessRunner::new(config.timeout(), config.max_output_bytes),
        }
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn workspaces(&self) -> &WorkspaceManager {
        &self.workspaces
    }

    #[instrument(skip_all, fields(language = %request.language))]
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let adapter = match self.validate(&request.source_code, &request.language) {
            Ok(adapter) => adapter,
            Err(e) => {
                debug!("Rejected request: {}", e);
                let (kind, message) = classify_error(&e);
                return ExecutionResult::failure(kind, message, Duration::ZERO, false);
            }
        };

        let raw = match self
            .run_job(adapter, &request.source_code, &request.stdin, Mode::Execute)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                let (kind, message) = classify_error(&e);
                warn!("Job failed before running: {}", e);
                return ExecutionResult::failure(kind, message, Duration::ZERO, false);
            }
        };

        let result = self.to_execution_result(raw);
        info!(
            status = %result.status,
            failure = ?result.failure,
            elapsed_ms = result.execution_time_millis,
            "Execution finished"
        );
        result
    }

    /// Stop after the compile step. Interpreted languages succeed without
    /// touching the filesystem.
    #[instrument(skip(self, source_code))]
    pub async fn compile(&self, source_code: &str, language: &str) -> CompileResult {
        let adapter = match self.validate(source_code, language) {
            Ok(adapter) => adapter,
            Err(e) => {
                let (kind, message) = classify_error(&e);
                return CompileResult::failure(kind, message);
            }
        };

        if !adapter.has_compile_step() {
            return CompileResult::success(NO_COMPILATION_NEEDED);
        }

        let raw = match self
            .run_job(adapter, source_code, "", Mode::CompileOnly)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                let (kind, message) = classify_error(&e);
                warn!("Compile job failed before running: {}", e);
                return CompileResult::failure(kind, message);
            }
        };

        let result = match raw.outcome {
            Outcome::Success { .. } => CompileResult::success(COMPILATION_SUCCESSFUL),
            Outcome::CompileFailure { message } | Outcome::RuntimeFailure { message } => {
                CompileResult::failure(FailureKind::CompileFailure, message)
            }
            Outcome::Timeout { stage } => {
                CompileResult::failure(FailureKind::Timeout, self.timeout_message(stage))
            }
            Outcome::LaunchFailure { program, reason } => {
                CompileResult::failure(FailureKind::LaunchFailure, launch_message(&program, &reason))
            }
        };
        info!(status = %result.status, "Compilation finished");
        result
    }

    fn validate(&self, source_code: &str, language: &str) -> Result<&dyn LanguageAdapter, Error> {
        let adapter = self.registry.resolve(language)?;
        if source_code.trim().is_empty() {
            return Err(Error::InvalidRequest("Code is required".to_string()));
        }
        Ok(adapter)
    }

    /// Owns the workspace for the duration of the job; release happens on
    /// every path out of here.
    async fn run_job(
        &self,
        adapter: &dyn LanguageAdapter,
        source_code: &str,
        stdin: &str,
        mode: Mode,
    ) -> Result<RawOutcome, Error> {
        let mut workspace = self.workspaces.allocate().await?;
        debug!(workspace = %workspace.id(), ?mode, "Workspace allocated");

        let result = self
            .run_in_workspace(adapter, source_code, stdin, mode, &mut workspace)
            .await;

        if let Err(e) = workspace.adopt_new_files().await {
            warn!(workspace = %workspace.id(), "Failed to scan workspace: {}", e);
        }
        workspace.release().await;

        result
    }

    async fn run_in_workspace(
        &self,
        adapter: &dyn LanguageAdapter,
        source_code: &str,
        stdin: &str,
        mode: Mode,
        workspace: &mut Workspace,
    ) -> Result<RawOutcome, Error> {
        let plan = adapter.prepare(source_code, workspace).await?;
        let steps = match mode {
            Mode::Execute => plan.steps(),
            Mode::CompileOnly => plan.compile_steps(),
        };
        Ok(self.runner.run(&steps, stdin).await)
    }

    fn to_execution_result(&self, raw: RawOutcome) -> ExecutionResult {
        let RawOutcome {
            outcome,
            elapsed,
            truncated,
        } = raw;

        match outcome {
            Outcome::Success { stdout, .. } => ExecutionResult::success(stdout, elapsed, truncated),
            Outcome::CompileFailure { message } => {
                ExecutionResult::failure(FailureKind::CompileFailure, message, elapsed, truncated)
            }
            Outcome::RuntimeFailure { message } => {
                ExecutionResult::failure(FailureKind::RuntimeFailure, message, elapsed, truncated)
            }
            Outcome::Timeout { stage } => ExecutionResult::failure(
                FailureKind::Timeout,
                self.timeout_message(stage),
                elapsed,
                truncated,
            ),
            Outcome::LaunchFailure { program, reason } => ExecutionResult::failure(
                FailureKind::LaunchFailure,
                launch_message(&program, &reason),
                elapsed,
                truncated,
            ),
        }
    }

    fn timeout_message(&self, stage: Stage) -> String {
        let what = match stage {
            Stage::Compile => "Compilation",
            Stage::Run => "Execution",
        };
        format!("{} timed out after {:?}", what, self.runner.timeout())
    }
}

fn launch_message(program: &str, reason: &str) -> String {
    format!("Failed to launch {}: {}", program, reason)
}

fn classify_error(error: &Error) -> (FailureKind, String) {
    match error {
        Error::UnsupportedLanguage(_) => (FailureKind::UnsupportedLanguage, error.to_string()),
        // Same wording the HTTP layer uses for its own validation
        Error::InvalidRequest(message) => (FailureKind::InvalidRequest, message.clone()),
        Error::Workspace { .. } | Error::Config(_) => (FailureKind::SystemError, error.to_string()),
    }
}
