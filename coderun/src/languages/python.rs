use std::path::Path;

use crate::{
    languages::LanguageAdapter, runner::CommandSpec, types::Language, workspace::Workspace,
};

pub struct PythonAdapter {
    interpreter: String,
}

impl PythonAdapter {
    pub fn new(interpreter: Option<String>) -> Self {
        Self {
            interpreter: interpreter.unwrap_or_else(|| "python3".to_string()),
        }
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn file_extension(&self) -> &str {
        "py"
    }

    fn required_tools(&self) -> Vec<&str> {
        vec![self.interpreter.as_str()]
    }

    fn run_command(&self, workspace: &Workspace, source_file: &Path) -> CommandSpec {
        CommandSpec::new(&self.interpreter)
            .path_arg(source_file)
            .current_dir(workspace.dir())
    }
}
