//! Access to dataset files at a fixed point in git history.
//!
//! Recovery pulls actor data back out of the revision that predates the
//! schema overhaul. Files are read with `git show` so the working tree
//! stays untouched; an in-memory store stands in during tests.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RevisionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{path} not found at revision {revision}")]
    NotFound { revision: String, path: String },
}

/// Reader for files as they existed at some source revision.
pub trait RevisionStore {
    /// Read a file's bytes, addressed relative to the repository root.
    fn read_file(&self, path: &str) -> Result<Vec<u8>, RevisionError>;
}

/// Store backed by `git show` against a local repository.
pub struct GitRevisionStore {
    repo_root: PathBuf,
    revision: String,
}

impl GitRevisionStore {
    pub fn new(repo_root: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        Self {
            repo_root: repo_root.into(),
            revision: revision.into(),
        }
    }
}

impl RevisionStore for GitRevisionStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, RevisionError> {
        let output = Command::new("git")
            .arg("show")
            .arg(format!("{}:{}", self.revision, path))
            .current_dir(&self.repo_root)
            .output()?;

        if !output.status.success() {
            return Err(RevisionError::NotFound {
                revision: self.revision.clone(),
                path: path.to_string(),
            });
        }

        Ok(output.stdout)
    }
}

/// In-memory store for tests and previews.
#[derive(Default)]
pub struct MemoryRevisionStore {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryRevisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl RevisionStore for MemoryRevisionStore {
    fn read_file(&self, path: &str) -> Result<Vec<u8>, RevisionError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| RevisionError::NotFound {
                revision: "memory".to_string(),
                path: path.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryRevisionStore::new();
        store.insert("data/actors/npcs.json", "[]");
        assert_eq!(store.read_file("data/actors/npcs.json").unwrap(), b"[]");
    }

    #[test]
    fn test_memory_store_missing_path() {
        let store = MemoryRevisionStore::new();
        assert!(matches!(
            store.read_file("data/actors/npcs.json"),
            Err(RevisionError::NotFound { .. })
        ));
    }

    fn git(dir: &std::path::Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=test", "-c", "user.email=test@test"])
            .args(args)
            .current_dir(dir)
            .status()
            .unwrap();
        assert!(status.success());
    }

    #[test]
    fn test_git_store_reads_committed_revision() {
        if Command::new("git").arg("--version").output().is_err() {
            return;
        }

        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data/actors")).unwrap();
        fs::write(dir.path().join("data/actors/npcs.json"), "[old]").unwrap();
        git(dir.path(), &["init", "-q"]);
        git(dir.path(), &["add", "."]);
        git(dir.path(), &["commit", "-q", "-m", "snapshot"]);
        fs::write(dir.path().join("data/actors/npcs.json"), "[new]").unwrap();

        let store = GitRevisionStore::new(dir.path(), "HEAD");
        assert_eq!(
            store.read_file("data/actors/npcs.json").unwrap(),
            b"[old]"
        );
        assert!(matches!(
            store.read_file("data/actors/enemies.json"),
            Err(RevisionError::NotFound { .. })
        ));
    }
}
