//! Per-job scratch directories: one per job, destroyed on every exit path.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use judge_core::model::{Job, LanguageProfile};
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("failed to create workspace directory {path}: {source}")]
    Create {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An allocated per-job directory. `Drop` removes it best-effort so a
/// panic mid-job still cleans up; the explicit `destroy` call is still the
/// primary path and is what's actually awaited/logged.
pub struct WorkspaceGuard {
    root: PathBuf,
    disarmed: bool,
}

impl WorkspaceGuard {
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Recursively removes the workspace. Failure is logged and swallowed
    /// — never propagated, per the cleanup-is-best-effort contract.
    pub fn destroy(mut self) {
        remove_dir_best_effort(&self.root);
        self.disarmed = true;
    }
}

impl Drop for WorkspaceGuard {
    fn drop(&mut self) {
        if !self.disarmed {
            remove_dir_best_effort(&self.root);
        }
    }
}

fn remove_dir_best_effort(path: &Path) {
    if let Err(err) = std::fs::remove_dir_all(path) {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "failed to remove workspace directory");
        }
    }
}

pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Allocates a fresh directory and materialises the solution and test
    /// files the profile demands. The directory name combines a
    /// high-resolution timestamp and a random suffix.
    pub fn create(
        &self,
        job: &Job,
        profile: &LanguageProfile,
        rendered_test_file: &str,
    ) -> Result<WorkspaceGuard, WorkspaceError> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let dir_name = format!("{nanos}-{}", Uuid::new_v4());
        let dir = self.root.join(dir_name);

        std::fs::create_dir_all(&dir).map_err(|source| WorkspaceError::Create {
            path: dir.display().to_string(),
            source,
        })?;

        let solution_path = dir.join(&profile.solution_filename);
        std::fs::write(&solution_path, &job.code).map_err(|source| WorkspaceError::Write {
            path: solution_path.display().to_string(),
            source,
        })?;

        let test_path = dir.join(&profile.test_filename);
        std::fs::write(&test_path, rendered_test_file).map_err(|source| WorkspaceError::Write {
            path: test_path.display().to_string(),
            source,
        })?;

        Ok(WorkspaceGuard {
            root: dir,
            disarmed: false,
        })
    }

    /// Removes any leftover per-job directory older than `grace`, in case
    /// the process previously crashed mid-job. Best-effort: a directory it
    /// can't read or remove is logged and skipped.
    pub fn sweep_stale(&self, grace: std::time::Duration) {
        let Ok(entries) = std::fs::read_dir(&self.root) else {
            return;
        };
        let now = SystemTime::now();
        for entry in entries.flatten() {
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            let Ok(modified) = metadata.modified() else {
                continue;
            };
            if now.duration_since(modified).unwrap_or_default() > grace {
                remove_dir_best_effort(&entry.path());
            }
        }
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
