use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

use crate::{
    languages::LanguageAdapter, runner::CommandSpec, types::Language, workspace::Workspace,
};

const IDENT: &str = r"[A-Za-z_$][A-Za-z0-9_$]*";

/// Comments and string/char literals, text blocks first so their quotes
/// are not read as ordinary strings.
static NOISE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"""(?:\\.|[^\\])*?"""|/\*.*?\*/|//[^\n]*|"(?:\\.|[^"\\\n])*"|'(?:\\.|[^'\\\n])*'"#)
        .expect("valid comment and literal pattern")
});

static PUBLIC_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\bpublic\s+(?:(?:final|abstract|strictfp|sealed|non-sealed)\s+)*(?:class|interface|enum|record)\s+({})",
        IDENT
    ))
    .expect("valid public type pattern")
});

static ANY_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(?:class|interface|enum|record)\s+({})", IDENT))
        .expect("valid type pattern")
});

/// javac insists that a public top-level type lives in `<Name>.java`, so
/// the file name has to come from the source text.
///
/// Falls back to the first type declared at all (a non-public one may live
/// in any file), then to `None`.
pub fn derive_class_name(source: &str) -> Option<String> {
    let stripped = NOISE.replace_all(source, " ");
    PUBLIC_TYPE
        .captures(&stripped)
        .or_else(|| ANY_TYPE.captures(&stripped))
        .map(|caps| caps[1].to_string())
}

pub struct JavaAdapter {
    compiler: String,
    runtime: String,
}

impl JavaAdapter {
    pub fn new(compiler: Option<String>, runtime: Option<String>) -> Self {
        Self {
            compiler: compiler.unwrap_or_else(|| "javac".to_string()),
            runtime: runtime.unwrap_or_else(|| "java".to_string()),
        }
    }

    fn class_name(&self, source: &str, workspace: &Workspace) -> String {
        derive_class_name(source).unwrap_or_else(|| {
            let fallback = format!("Job{}", workspace.id().simple());
            warn!(
                workspace = %workspace.id(),
                class = %fallback,
                "No class declaration found in Java source, using fallback name"
            );
            fallback
        })
    }
}

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn file_extension(&self) -> &str {
        "java"
    }

    fn required_tools(&self) -> Vec<&str> {
        vec![self.compiler.as_str(), self.runtime.as_str()]
    }

    fn has_compile_step(&self) -> bool {
        true
    }

    fn source_file_name(&self, source: &str, workspace: &Workspace) -> String {
        format!("{}.{}", self.class_name(source, workspace), self.file_extension())
    }

    // Class files are picked up from the workspace after compilation; a
    // single source may produce several of them.

    fn compile_command(&self, workspace: &Workspace, source_file: &Path) -> Option<CommandSpec> {
        Some(
            CommandSpec::new(&self.compiler)
                .arg("-d")
                .path_arg(workspace.dir())
                .path_arg(source_file)
                .current_dir(workspace.dir()),
        )
    }

    fn run_command(&self, workspace: &Workspace, source_file: &Path) -> CommandSpec {
        let class = source_file
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        CommandSpec::new(&self.runtime)
            .arg("-cp")
            .path_arg(workspace.dir())
            .arg(class)
            .current_dir(workspace.dir())
    }
}
