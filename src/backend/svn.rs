//! Subversion backend driven through the `svn` command line client.

use crate::backend::{
    relative_to, remove_leftovers, FileActions, StatusMap, VcBackend, VcKind, VcsCommand,
};
use crate::core::error::{Result, VcsOverlayError};
use crate::core::vc_status::VCItemStatus;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct SubversionBackend {
    root: PathBuf,
}

impl SubversionBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn svn(&self) -> VcsCommand {
        VcsCommand::new("svn", &self.root).arg("--non-interactive")
    }

    fn relative_paths(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        paths.iter().map(|p| relative_to(&self.root, p)).collect()
    }
}

/// Map the item, property and tree-conflict columns of one status line.
fn status_from_columns(line: &str) -> VCItemStatus {
    let columns: Vec<char> = line.chars().take(7).collect();
    let column = |i: usize| columns.get(i).copied().unwrap_or(' ');

    if column(1) == 'C' || column(6) == 'C' {
        return VCItemStatus::Conflicted;
    }

    match column(0) {
        'C' | '~' => VCItemStatus::Conflicted,
        'D' | '!' => VCItemStatus::Deleted,
        'A' => VCItemStatus::Added,
        'M' | 'R' => VCItemStatus::Modified,
        '?' => VCItemStatus::Unknown,
        'I' => VCItemStatus::Ignored,
        _ if column(1) == 'M' => VCItemStatus::Modified,
        _ => VCItemStatus::UpToDate,
    }
}

/// Lines that carry an item: seven status columns, a space, the path.
fn is_item_line(line: &str) -> bool {
    line.len() > 8 && line.as_bytes()[7] == b' ' && !line.trim_start().starts_with('>')
}

/// Parse `svn status --no-ignore` output into a status map.
pub fn parse_status(output: &str) -> Result<StatusMap> {
    let mut map = StatusMap::new();

    for line in output.lines().filter(|l| is_item_line(l)) {
        let path = line
            .get(8..)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| VcsOverlayError::unparsable_status("svn", line))?;

        let status = status_from_columns(line);
        if status != VCItemStatus::UpToDate {
            map.insert(PathBuf::from(path.replace('\\', "/")), status);
        }
    }

    Ok(map)
}

impl FileActions for SubversionBackend {
    fn file_new(&self, path: &Path) -> Result<bool> {
        let rel = relative_to(&self.root, path)?;
        self.svn().arg("add").arg("--").arg(rel).run()?;
        Ok(true)
    }

    fn file_rename(&self, from: &Path, to: &Path) -> Result<bool> {
        self.file_move(from, to)
    }

    fn file_move(&self, from: &Path, to: &Path) -> Result<bool> {
        let from_rel = relative_to(&self.root, from)?;
        let to_rel = relative_to(&self.root, to)?;
        self.svn()
            .arg("move")
            .arg("--")
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
        self.svn()
            .args(["delete", "--force", "--"])
            .args(&rels)
            .run()?;
        remove_leftovers(paths)?;
        Ok(true)
    }
}

impl VcBackend for SubversionBackend {
    fn kind(&self) -> VcKind {
        VcKind::Subversion
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn bulk_status(&self) -> Result<StatusMap> {
        let output = self.svn().args(["status", "--no-ignore"]).run()?;
        parse_status(&output)
    }

    fn path_status(&self, path: &Path) -> Result<VCItemStatus> {
        let rel = relative_to(&self.root, path)?;
        if rel.as_os_str().is_empty() {
            return Ok(VCItemStatus::UpToDate);
        }

        let output = self
            .svn()
            .args(["status", "-v", "--no-ignore", "--depth", "empty", "--"])
            .arg(rel)
            .run()?;

        Ok(output
            .lines()
            .find(|l| is_item_line(l))
            .map(status_from_columns)
            .unwrap_or(VCItemStatus::Unknown))
    }

    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let rels = self.relative_paths(paths)?;
        self.svn()
            .args(["commit", "-m", message, "--"])
            .args(&rels)
            .run()?;
        Ok(())
    }
}
