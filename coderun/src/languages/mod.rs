//! Language-specific adapters
//!
//! An adapter knows how a language names its files and which commands turn
//! a source file into running code. Everything toolchain-specific lives here
//! so the runner and the executor stay language-agnostic.

mod c;
mod cpp;
mod java;
mod javascript;
mod python;

pub use c::CAdapter;
pub use cpp::CppAdapter;
pub use java::{derive_class_name, JavaAdapter};
pub use javascript::JavaScriptAdapter;
pub use python::PythonAdapter;

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use which::which;

use crate::{
    config::ToolchainConfig,
    error::Error,
    runner::{CommandSpec, Step},
    types::Language,
    workspace::Workspace,
};

/// Files written and commands built for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    pub source_file: PathBuf,
    pub compile: Option<CommandSpec>,
    pub run: CommandSpec,
}

impl JobPlan {
    /// Compile (if any) followed by run.
    pub fn steps(&self) -> Vec<Step> {
        self.compile
            .iter()
            .cloned()
            .map(Step::compile)
            .chain(std::iter::once(Step::run(self.run.clone())))
            .collect()
    }

    /// Only the compile step; empty for interpreted languages.
    pub fn compile_steps(&self) -> Vec<Step> {
        self.compile.iter().cloned().map(Step::compile).collect()
    }
}

/// Trait for language-specific adapters
#[async_trait]
pub trait LanguageAdapter: Send + Sync {
    fn language(&self) -> Language;

    /// Get the file extension for source files
    fn file_extension(&self) -> &str;

    /// Executables that must be on the search path
    fn required_tools(&self) -> Vec<&str>;

    fn has_compile_step(&self) -> bool {
        false
    }

    /// Name of the source file inside the workspace.
    fn source_file_name(&self, _source: &str, workspace: &Workspace) -> String {
        format!("{}.{}", workspace.id(), self.file_extension())
    }

    /// Name of the file the compile step produces, if it is known up front.
    fn compiled_artifact_name(&self, _workspace: &Workspace) -> Option<String> {
        None
    }

    fn compile_command(&self, _workspace: &Workspace, _source_file: &Path) -> Option<CommandSpec> {
        None
    }

    fn run_command(&self, workspace: &Workspace, source_file: &Path) -> CommandSpec;

    /// Write the source into the workspace and build the command sequence.
    /// Every file named here is registered with the workspace for cleanup.
    async fn prepare(&self, source: &str, workspace: &mut Workspace) -> Result<JobPlan, Error> {
        let file_name = self.source_file_name(source, workspace);
        let source_file = workspace.write_artifact(&file_name, source).await?;

        if let Some(artifact) = self.compiled_artifact_name(workspace) {
            let path = workspace.path_for(&artifact);
            workspace.register(path);
        }

        Ok(JobPlan {
            compile: self.compile_command(workspace, &source_file),
            run: self.run_command(workspace, &source_file),
            source_file,
        })
    }

    fn missing_tools(&self) -> Vec<String> {
        self.required_tools()
            .into_iter()
            .filter(|tool| !check_command(tool))
            .map(str::to_string)
            .collect()
    }
}

/// One adapter per supported language, built from the toolchain config.
pub struct AdapterRegistry {
    c: CAdapter,
    cpp: CppAdapter,
    java: JavaAdapter,
    python: PythonAdapter,
    javascript: JavaScriptAdapter,
}

impl AdapterRegistry {
    pub fn new(toolchains: &ToolchainConfig) -> Self {
        Self {
            c: CAdapter::new(Some(toolchains.gcc.clone())),
            cpp: CppAdapter::new(Some(toolchains.gxx.clone())),
            java: JavaAdapter::new(Some(toolchains.javac.clone()), Some(toolchains.java.clone())),
            python: PythonAdapter::new(Some(toolchains.python.clone())),
            javascript: JavaScriptAdapter::new(Some(toolchains.node.clone())),
        }
    }

    /// Look up the adapter for a caller-supplied identifier such as `C++`
    /// or `py`.
    pub fn resolve(&self, language_id: &str) -> Result<&dyn LanguageAdapter, Error> {
        let language: Language = language_id.parse()?;
        Ok(self.get(language))
    }

    pub fn get(&self, language: Language) -> &dyn LanguageAdapter {
        match language {
            Language::C => &self.c,
            Language::Cpp => &self.cpp,
            Language::Java => &self.java,
            Language::Python => &self.python,
            Language::JavaScript => &self.javascript,
        }
    }

    pub fn adapters(&self) -> impl Iterator<Item = &dyn LanguageAdapter> + '_ {
        Language::ALL.into_iter().map(|language| self.get(language))
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new(&ToolchainConfig::default())
    }
}

/// Shared by the C and C++ adapters: `<compiler> -o <id>.out <source>`.
pub(crate) fn native_compile_command(
    compiler: &str,
    workspace: &Workspace,
    source_file: &Path,
) -> CommandSpec {
    CommandSpec::new(compiler)
        .arg("-o")
        .path_arg(workspace.path_for(&native_binary_name(workspace)))
        .path_arg(source_file)
        .current_dir(workspace.dir())
}

pub(crate) fn native_binary_name(workspace: &Workspace) -> String {
    format!("{}.out", workspace.id())
}

pub(crate) fn check_command(cmd: &str) -> bool {
    which(cmd).is_ok()
}

#[cfg(test)]
pub(crate) fn skip_if_not_available(tools: &[&str]) -> bool {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which(**tool).is_err())
        .map(|s| (*s).to_string())
        .collect();

    if !missing.is_empty() {
        eprintln!("Skipping test: {} not available", missing.join(", "));
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_synonyms_to_the_same_adapter() {
        let registry = AdapterRegistry::default();
        assert_eq!(registry.resolve("C++").unwrap().language(), Language::Cpp);
        assert_eq!(registry.resolve("py").unwrap().language(), Language::Python);
        assert_eq!(
            registry.resolve("js").unwrap().language(),
            Language::JavaScript
        );
    }

    #[test]
    fn unknown_language_is_rejected() {
        let registry = AdapterRegistry::default();
        assert!(matches!(
            registry.resolve("ruby"),
            Err(Error::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn every_language_has_an_adapter() {
        let registry = AdapterRegistry::default();
        let languages: Vec<_> = registry.adapters().map(|a| a.language()).collect();
        assert_eq!(languages, Language::ALL.to_vec());
    }

    #[test]
    fn compile_step_matches_language_family() {
        let registry = AdapterRegistry::default();
        assert!(registry.get(Language::C).has_compile_step());
        assert!(registry.get(Language::Cpp).has_compile_step());
        assert!(registry.get(Language::Java).has_compile_step());
        assert!(!registry.get(Language::Python).has_compile_step());
        assert!(!registry.get(Language::JavaScript).has_compile_step());
    }

    #[test]
    fn missing_tools_reports_configured_names() {
        let toolchains = ToolchainConfig {
            python: "coderun-missing-python".to_string(),
            ..ToolchainConfig::default()
        };
        let registry = AdapterRegistry::new(&toolchains);
        assert_eq!(
            registry.get(Language::Python).missing_tools(),
            vec!["coderun-missing-python".to_string()]
        );
    }
}
