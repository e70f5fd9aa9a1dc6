//! [`TestWorkspace`] builder for sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use flow_fs::NormalizedPath;
use tempfile::TempDir;

use crate::git;

/// A temporary directory laid out the way a CI job runs a sync:
///
/// ```text
/// <root>/repo/             git working tree
/// <root>/repo/artifacts/   artifact bundles
/// <root>/work/             scratch space
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create the layout with an initialised, empty git repository.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("repo/artifacts")).unwrap();
        fs::create_dir_all(temp_dir.path().join("work")).unwrap();
        git::real_git_repo(&temp_dir.path().join("repo"));
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.root().join("repo")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root().join("repo/artifacts")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root().join("work")
    }

    pub fn repo_path(&self) -> NormalizedPath {
        NormalizedPath::new(self.repo_dir())
    }

    pub fn artifacts_path(&self) -> NormalizedPath {
        NormalizedPath::new(self.artifacts_dir())
    }

    pub fn work_path(&self) -> NormalizedPath {
        NormalizedPath::new(self.work_dir())
    }

    /// Assert that `path` (relative to the artifacts dir) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_artifact_file_exists(&self, path: &str) {
        let full_path = self.artifacts_dir().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the artifacts dir) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_artifact_file_not_exists(&self, path: &str) {
        let full_path = self.artifacts_dir().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to the artifacts dir) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_artifact_file_contains(&self, path: &str, content: &str) {
        let full_path = self.artifacts_dir().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
