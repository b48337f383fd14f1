use std::path::Path;

use crate::{
    languages::{native_binary_name, native_compile_command, LanguageAdapter},
    runner::CommandSpec,
    types::Language,
    workspace::Workspace,
};

pub struct CAdapter {
    compiler: String,
}

impl CAdapter {
    pub fn new(compiler: Option<String>) -> Self {
        Self {
            compiler: compiler.unwrap_or_else(|| "gcc".to_string()),
        }
    }
}

impl LanguageAdapter for CAdapter {
    fn language(&self) -> Language {
        Language::C
    }

    fn file_extension(&self) -> &str {
        "c"
    }

    fn required_tools(&self) -> Vec<&str> {
        vec![self.compiler.as_str()]
    }

    fn has_compile_step(&self) -> bool {
        true
    }

    fn compiled_artifact_name(&self, workspace: &Workspace) -> Option<String> {
        Some(native_binary_name(workspace))
    }

    fn compile_command(&self, workspace: &Workspace, source_file: &Path) -> Option<CommandSpec> {
        Some(native_compile_command(&self.compiler, workspace, source_file))
    }

    fn run_command(&self, workspace: &Workspace, _source_file: &Path) -> CommandSpec {
        CommandSpec::new(
            workspace
                .path_for(&native_binary_name(workspace))
                .to_string_lossy(),
        )
        .current_dir(workspace.dir())
    }
}
