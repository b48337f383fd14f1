//! Job-scoped scratch directories.
//!
//! Every job gets its own directory `<root>/<uuid>`; all files the job creates
//! are registered on the [`Workspace`] handle and removed when it is released.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::Error;

/// Hands out fresh workspaces under a fixed root directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a new workspace directory keyed by a random UUID.
    ///
    /// The root is created on demand; an already existing root is fine, so
    /// concurrent allocations never race on it.
    pub async fn allocate(&self) -> Result<Workspace, Error> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Error::workspace(&self.root, e))?;

        let id = Uuid::new_v4();
        let dir = self.root.join(id.to_string());

        // create_dir (not create_dir_all) so an id collision surfaces as an error
        fs::create_dir(&dir)
            .await
            .map_err(|e| Error::workspace(&dir, e))?;

        debug!(workspace = %id, dir = %dir.display(), "Allocated workspace");

        Ok(Workspace {
            id,
            dir,
            artifacts: Vec::new(),
            released: false,
        })
    }
}

/// Outcome of releasing a workspace. Only used for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: usize,
}

/// A directory owned by exactly one in-flight job.
#[derive(Debug)]
pub struct Workspace {
    id: Uuid,
    dir: PathBuf,
    artifacts: Vec<PathBuf>,
    released: bool,
}

impl Workspace {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for a file named `name` inside this workspace. Not registered.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    pub fn artifacts(&self) -> &[PathBuf] {
        &self.artifacts
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Track a file for removal on release.
    pub fn register(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.artifacts.contains(&path) {
            self.artifacts.push(path);
        }
    }

    /// Write `contents` to `name` inside the workspace and register it.
    pub async fn write_artifact(&mut self, name: &str, contents: &str) -> Result<PathBuf, Error> {
        let path = self.path_for(name);
        // Registered first so a partial write is still cleaned up
        self.register(path.clone());
        fs::write(&path, contents)
            .await
            .map_err(|e| Error::workspace(&path, e))?;
        Ok(path)
    }

    /// Register every file in the workspace that a toolchain created on its
    /// own (e.g. class files for nested Java classes).
    pub async fn adopt_new_files(&mut self) -> Result<usize, Error> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|e| Error::workspace(&self.dir, e))?;

        let mut adopted = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::workspace(&self.dir, e))?
        {
            let path = entry.path();
            if !self.artifacts.contains(&path) {
                debug!(workspace = %self.id, artifact = %path.display(), "Adopted artifact");
                self.artifacts.push(path);
                adopted += 1;
            }
        }
        Ok(adopted)
    }

    /// Remove every registered artifact, then the directory itself.
    ///
    /// Each removal is attempted independently and failures are only logged.
    /// Calling this more than once is a no-op.
    pub async fn release(&mut self) -> CleanupReport {
        if self.released {
            return CleanupReport::default();
        }
        self.released = true;

        let id = self.id;
        let dir = self.dir.clone();
        let artifacts = std::mem::take(&mut self.artifacts);

        match tokio::task::spawn_blocking(move || remove_all(id, &dir, &artifacts)).await {
            Ok(report) => report,
            Err(e) => {
                error!(workspace = %id, "Cleanup task failed: {}", e);
                CleanupReport {
                    removed: 0,
                    failed: 1,
                }
            }
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.released {
            warn!(workspace = %self.id, "Workspace dropped without release, cleaning up");
            self.released = true;
            let artifacts = std::mem::take(&mut self.artifacts);
            remove_all(self.id, &self.dir, &artifacts);
        }
    }
}

fn remove_all(id: Uuid, dir: &Path, artifacts: &[PathBuf]) -> CleanupReport {
    let mut report = CleanupReport::default();

    for artifact in artifacts {
        match std::fs::remove_file(artifact) {
            Ok(()) => report.removed += 1,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(workspace = %id, artifact = %artifact.display(), "Artifact already gone");
            }
            Err(e) => {
                report.failed += 1;
                warn!(
                    workspace = %id,
                    artifact = %artifact.display(),
                    "Failed to remove artifact: {}", e
                );
            }
        }
    }

    match std::fs::remove_dir(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(
                workspace = %id,
                dir = %dir.display(),
                "Workspace not empty after artifact removal ({}), removing recursively", e
            );
            if let Err(e) = std::fs::remove_dir_all(dir) {
                report.failed += 1;
                error!(workspace = %id, dir = %dir.display(), "Failed to remove workspace: {}", e);
            }
        }
    }

    debug!(
        workspace = %id,
        removed = report.removed,
        failed = report.failed,
        "Released workspace"
    );
    report
}
