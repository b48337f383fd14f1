use clap::Parser;
use coderun::{CodeExecutionService, CodeRunner, ExecutorConfig};
use coderun_server::{create_app, run_server};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to listen on
    #[arg(short, long, default_value = "0.0.0.0:3000")]
    addr: SocketAddr,

    /// TOML file with executor settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wall-clock limit for one job, compile and run together
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Cap on captured stdout and stderr, per stream
    #[arg(long)]
    max_output_bytes: Option<usize>,

    /// Maximum number of concurrent executions
    #[arg(short, long)]
    max_concurrent: Option<usize>,

    /// Directory job workspaces are created under
    #[arg(long)]
    temp_root: Option<PathBuf>,
}

impl Args {
    fn executor_config(&self) -> anyhow::Result<ExecutorConfig> {
        let mut config = match &self.config {
            Some(path) => ExecutorConfig::from_toml_file(path)?,
            None => ExecutorConfig::default(),
        };

        if let Some(timeout_secs) = self.timeout_secs {
            config.timeout_secs = timeout_secs;
        }
        if let Some(max_output_bytes) = self.max_output_bytes {
            config.max_output_bytes = max_output_bytes;
        }
        if let Some(max_concurrent) = self.max_concurrent {
            config.max_concurrent_executions = max_concurrent;
        }
        if let Some(temp_root) = &self.temp_root {
            config.temp_root = temp_root.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = args.executor_config()?;
    info!(
        temp_root = %config.temp_root.display(),
        timeout_secs = config.timeout_secs,
        max_concurrent = config.max_concurrent_executions,
        "Executor configured"
    );

    let service = CodeExecutionService::new(config)?;
    for status in service.languages() {
        if !status.available {
            warn!(
                language = %status.language,
                missing = ?status.missing_tools,
                "Toolchain not found, jobs for this language will fail to launch"
            );
        }
    }

    let app = create_app(Arc::new(service));
    run_server(app, args.addr).await?;

    Ok(())
}
