//! Git backend: the reference adapter.
//!
//! Status is read through `git2`, which is fast enough for bulk scans of large trees.
//! Mutations shell out to the `git` CLI in the root's working directory so hooks and
//! user configuration apply exactly as on the command line.

use crate::backend::{
    relative_to, remove_leftovers, FileActions, StatusMap, VcBackend, VcKind, VcsCommand,
};
use crate::core::error::{Result, VcsOverlayError};
use crate::core::vc_status::VCItemStatus;
use git2::{ErrorCode, Repository, Status, StatusEntry, StatusOptions};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct GitBackend {
    root: PathBuf,
}

impl GitBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // git2::Repository is not Sync, so every query opens its own handle.
    fn open(&self) -> Result<Repository> {
        Ok(Repository::open(&self.root)?)
    }

    fn git(&self) -> VcsCommand {
        VcsCommand::new("git", &self.root)
    }

    fn relative_paths(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        paths.iter().map(|p| relative_to(&self.root, p)).collect()
    }

    fn directory_status(&self, repo: &Repository, rel: &Path) -> Result<VCItemStatus> {
        if repo.is_path_ignored(rel)? {
            return Ok(VCItemStatus::Ignored);
        }

        let index = repo.index()?;
        for entry in index.iter() {
            let entry_path =
                std::str::from_utf8(&entry.path).map_err(|_| VcsOverlayError::InvalidUtf8Path)?;
            if Path::new(entry_path).starts_with(rel) {
                return Ok(VCItemStatus::UpToDate);
            }
        }

        Ok(VCItemStatus::Unknown)
    }
}

/// Path a status entry is reported under.
///
/// Renames are keyed on their destination; the source no longer exists on disk and
/// gets no entry of its own.
fn entry_path(entry: &StatusEntry<'_>) -> Result<PathBuf> {
    let status = entry.status();
    let delta = if status.contains(Status::WT_RENAMED) {
        entry.index_to_workdir()
    } else if status.contains(Status::INDEX_RENAMED) {
        entry.head_to_index()
    } else {
        None
    };

    if let Some(path) = delta.and_then(|delta| delta.new_file().path().map(Path::to_path_buf)) {
        return Ok(path);
    }
    let path = entry.path().ok_or(VcsOverlayError::InvalidUtf8Path)?;
    // Collapsed directories come back as "dir/"
    Ok(PathBuf::from(path.trim_end_matches('/')))
}

impl FileActions for GitBackend {
    fn file_new(&self, path: &Path) -> Result<bool> {
        let rel = relative_to(&self.root, path)?;
        self.git().args(["add", "--"]).arg(rel).run()?;
        Ok(true)
    }

    fn file_rename(&self, from: &Path, to: &Path) -> Result<bool> {
        self.file_move(from, to)
    }

    fn file_move(&self, from: &Path, to: &Path) -> Result<bool> {
        let from_rel = relative_to(&self.root, from)?;
        let to_rel = relative_to(&self.root, to)?;
        self.git()
            .args(["mv", "--"])
            .arg(from_rel)
            .arg(to_rel)
            .run()?;
        Ok(true)
    }

    fn file_delete(&self, paths: &[PathBuf], _confirm: bool) -> Result<bool> {
        if paths.is_empty() {
            return Ok(false);
        }

        let rels = self.relative_paths(paths)?;
        self.git().args(["rm", "-r", "-f", "--"]).args(&rels).run()?;

        // git rm leaves untracked leftovers behind
        remove_leftovers(paths)?;
        Ok(true)
    }
}

impl VcBackend for GitBackend {
    fn kind(&self) -> VcKind {
        VcKind::Git
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn bulk_status(&self) -> Result<StatusMap> {
        let repo = self.open()?;

        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(false)
            .include_ignored(true)
            .recurse_ignored_dirs(false)
            .renames_head_to_index(true);

        let statuses = repo.statuses(Some(&mut opts))?;
        let mut map = StatusMap::new();

        for entry in statuses.iter() {
            let status = VCItemStatus::from_git2(entry.status());
            if status == VCItemStatus::UpToDate {
                continue;
            }
            let key = entry_path(&entry)?;
            let slot = map.entry(key).or_insert(status);
            *slot = (*slot).max(status);
        }

        log::debug!(
            "git status for {}: {} non-clean entries",
            self.root.display(),
            map.len()
        );
        Ok(map)
    }

    fn path_status(&self, path: &Path) -> Result<VCItemStatus> {
        let rel = relative_to(&self.root, path)?;
        if rel.as_os_str().is_empty() {
            return Ok(VCItemStatus::UpToDate);
        }

        let repo = self.open()?;
        if path.is_dir() {
            return self.directory_status(&repo, &rel);
        }

        match repo.status_file(&rel) {
            Ok(flags) => Ok(VCItemStatus::from_git2(flags)),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(VCItemStatus::Unknown),
            Err(e) => Err(e.into()),
        }
    }

    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let rels = self.relative_paths(paths)?;
        self.git()
            .args(["commit", "-m", message, "--"])
            .args(&rels)
            .run()?;
        log::info!("Committed {} path(s) in {}", rels.len(), self.root.display());
        Ok(())
    }
}
