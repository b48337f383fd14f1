use std::path::Path;

use crate::{
    languages::LanguageAdapter, runner::CommandSpec, types::Language, workspace::Workspace,
};

pub struct JavaScriptAdapter {
    node: String,
}

impl JavaScriptAdapter {
    pub fn new(node: Option<String>) -> Self {
        Self {
            node: node.unwrap_or_else(|| "node".to_string()),
        }
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn file_extension(&self) -> &str {
        "js"
    }

    fn required_tools(&self) -> Vec<&str> {
        vec![self.node.as_str()]
    }

    fn run_command(&self, workspace: &Workspace, source_file: &Path) -> CommandSpec {
        CommandSpec::new(&self.node)
            .path_arg(source_file)
            .current_dir(workspace.dir())
    }
}
