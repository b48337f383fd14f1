use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use crate::{
    config::ExecutorConfig,
    error::Error,
    executor::CodeExecutor,
    types::{CompileResult, ExecutionRequest, ExecutionResult, FailureKind, LanguageStatus},
};

/// What the HTTP layer (or any other caller) needs from the core.
#[async_trait]
pub trait CodeRunner: Send + Sync {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionResult;

    async fn compile(&self, source_code: String, language: String) -> CompileResult;

    fn languages(&self) -> Vec<LanguageStatus>;
}

/// [`CodeExecutor`] behind a permit pool bounding how many jobs run at once.
#[derive(Clone)]
pub struct CodeExecutionService {
    executor: Arc<CodeExecutor>,
    semaphore: Arc<Semaphore>,
}

impl CodeExecutionService {
    pub fn new(config: ExecutorConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            executor: Arc::new(CodeExecutor::new(&config)),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_executions)),
        })
    }

    pub fn executor(&self) -> &CodeExecutor {
        &self.executor
    }

    pub fn get_available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[async_trait]
impl CodeRunner for CodeExecutionService {
    async fn execute(&self, request: ExecutionRequest) -> ExecutionResult {
        // Acquire execution permit
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("Failed to acquire execution permit: {}", e);
                return ExecutionResult::failure(
                    FailureKind::SystemError,
                    "Execution service is shutting down".to_string(),
                    Duration::ZERO,
                    false,
                );
            }
        };

        debug!(language = %request.language, "Starting code execution");
        self.executor.execute(&request).await
    }

    async fn compile(&self, source_code: String, language: String) -> CompileResult {
        let _permit = match self.semaphore.acquire().await {
            Ok(permit) => permit,
            Err(e) => {
                error!("Failed to acquire execution permit: {}", e);
                return CompileResult::failure(
                    FailureKind::SystemError,
                    "Execution service is shutting down",
                );
            }
        };

        self.executor.compile(&source_code, &language).await
    }

    fn languages(&self) -> Vec<LanguageStatus> {
        self.executor
            .registry()
            .adapters()
            .map(|adapter| {
                let missing_tools = adapter.missing_tools();
                LanguageStatus {
                    language: adapter.language(),
                    available: missing_tools.is_empty(),
                    missing_tools,
                }
            })
            .collect()
    }
}
