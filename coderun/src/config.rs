use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Runtime configuration for the execution core.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Directory under which every job workspace is created
    pub temp_root: PathBuf,
    /// Wall-clock budget for the whole compile + run sequence (seconds)
    pub timeout_secs: u64,
    /// Cap on captured bytes, applied to stdout and stderr separately
    pub max_output_bytes: usize,
    /// Jobs allowed in flight at once
    pub max_concurrent_executions: usize,
    pub toolchains: ToolchainConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            temp_root: std::env::temp_dir().join("coderun"),
            timeout_secs: 10,
            max_output_bytes: 10 * 1024 * 1024, // 10MB
            max_concurrent_executions: 10,
            toolchains: ToolchainConfig::default(),
        }
    }
}

impl ExecutorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load a config from a TOML file; missing keys fall back to defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, Error> {
        let config: ExecutorConfig =
            toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than zero".into()));
        }
        if self.max_output_bytes == 0 {
            return Err(Error::Config(
                "max_output_bytes must be greater than zero".into(),
            ));
        }
        if self.max_concurrent_executions == 0 {
            return Err(Error::Config(
                "max_concurrent_executions must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Executable names (or absolute paths) of the host toolchains.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    pub gcc: String,
    pub gxx: String,
    pub javac: String,
    pub java: String,
    pub python: String,
    pub node: String,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            gcc: "gcc".to_string(),
            gxx: "g++".to_string(),
            javac: "javac".to_string(),
            java: "java".to_string(),
            python: "python3".to_string(),
            node: "node".to_string(),
        }
    }
}
