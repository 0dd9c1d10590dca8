//! Git repository management and setup utilities
//!
//! Provides functions for creating and managing test repositories with various states.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Test repository setup result containing both the temporary directory
/// and the repository path. The TempDir must be kept alive for the duration
/// of the test to prevent cleanup.
pub struct TestRepo {
    pub temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestRepo {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute path of `name` inside the repository
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

/// Runs git in `repo_path` and returns its stdout
pub fn git(repo_path: &Path, args: &[&str]) -> anyhow::Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()?;
    anyhow::ensure!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Sets up a fresh git repository for testing
///
/// The path is canonical, so it compares equal to what the engine resolves.
pub fn setup_test_repo() -> anyhow::Result<TestRepo> {
    let temp_dir = TempDir::new()?;
    let repo_path = temp_dir.path().canonicalize()?;

    git(&repo_path, &["init", "--quiet"])?;
    // Set git config to avoid prompts during tests
    git(&repo_path, &["config", "user.name", "Test User"])?;
    git(&repo_path, &["config", "user.email", "test@example.com"])?;

    Ok(TestRepo {
        temp_dir,
        path: repo_path,
    })
}

/// Sets up a git repository with "initial.txt" committed
pub fn setup_test_repo_with_initial_commit() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo()?;

    create_file(&repo.path, "initial.txt", "initial content\n")?;
    git_add(&repo.path, "initial.txt")?;
    git_commit(&repo.path, "Initial commit")?;

    Ok(repo)
}

/// Creates a file, and its parent directories, with the given content
pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> anyhow::Result<()> {
    let path = repo_path.join(filename);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

pub fn git_add(repo_path: &Path, filename: &str) -> anyhow::Result<()> {
    git(repo_path, &["add", filename])?;
    Ok(())
}

pub fn git_commit(repo_path: &Path, message: &str) -> anyhow::Result<()> {
    git(repo_path, &["commit", "--quiet", "-m", message])?;
    Ok(())
}

/// Files git tracks, one per line
pub fn tracked_files(repo_path: &Path) -> anyhow::Result<Vec<String>> {
    Ok(git(repo_path, &["ls-files"])?
        .lines()
        .map(str::to_string)
        .collect())
}

/// Subject line of the latest commit
pub fn last_commit_subject(repo_path: &Path) -> anyhow::Result<String> {
    Ok(git(repo_path, &["log", "-1", "--format=%s"])?.trim().to_string())
}
