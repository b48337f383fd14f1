pub mod defaults {
    use std::path::Path;

    use crate::{CodeExecutionService, ExecutorConfig};

    pub fn default_test_config(root: &Path) -> ExecutorConfig {
        ExecutorConfig {
            temp_root: root.to_path_buf(),
            timeout_secs: 10,
            max_output_bytes: 1024 * 1024, // 1MB
            max_concurrent_executions: 4,
            ..ExecutorConfig::default()
        }
    }

    pub fn setup_test_service(root: &Path) -> CodeExecutionService {
        CodeExecutionService::new(default_test_config(root)).expect("valid test config")
    }

    pub fn short_timeout_service(root: &Path, timeout_secs: u64) -> CodeExecutionService {
        CodeExecutionService::new(ExecutorConfig {
            timeout_secs,
            ..default_test_config(root)
        })
        .expect("valid test config")
    }
}

pub mod assertions {
    use std::path::Path;

    /// Nothing a finished job created may survive under the root.
    pub fn assert_no_leftovers(root: &Path) {
        if !root.exists() {
            return;
        }
        let leftovers: Vec<_> = std::fs::read_dir(root)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert!(leftovers.is_empty(), "leftover artifacts: {:?}", leftovers);
    }
}
