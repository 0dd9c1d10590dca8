//! Test data generation utilities and predefined scenarios
//!
//! Provides functions for creating repositories with specific file states.

#![allow(dead_code)]

use super::repository::*;

/// Scenario: a committed tree with a clean file, a nested directory and a modified file
///
/// ```text
/// initial.txt      modified
/// clean.txt        up to date
/// src/lib.txt      up to date
/// notes.txt        untracked
/// ```
pub fn create_mixed_repo() -> anyhow::Result<TestRepo> {
    let repo = setup_test_repo_with_initial_commit()?;

    create_file(&repo.path, "clean.txt", "clean\n")?;
    create_file(&repo.path, "src/lib.txt", "library\n")?;
    git_add(&repo.path, ".")?;
    git_commit(&repo.path, "Add sources")?;

    create_file(&repo.path, "initial.txt", "modified content\n")?;
    create_file(&repo.path, "notes.txt", "scratch\n")?;

    Ok(repo)
}
