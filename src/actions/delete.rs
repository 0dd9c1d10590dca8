//! Classification of a delete batch before anything touches the disk.

use crate::watch::resolver::{VcRoot, WatcherVcResult};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// A batch that must not be deleted as a whole.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeDelete {
    #[error("The selected elements are located in different directories.")]
    DifferentDirectories,

    #[error("The selection mixes versioned and unversioned elements.")]
    MixedSelection,
}

/// How a delete batch splits between the backend and the plain filesystem.
#[derive(Debug, Default)]
pub struct DeletePlan {
    pub vcs_remove: Vec<PathBuf>,
    pub regular_remove: Vec<PathBuf>,
    /// Root-relative files with local changes that would be lost.
    pub has_modification: Vec<PathBuf>,
    /// Root-relative untracked or ignored files inside tracked directories.
    pub has_unknown: Vec<PathBuf>,
    pub root: Option<Arc<VcRoot>>,
}

impl DeletePlan {
    pub fn is_regular(&self) -> bool {
        self.vcs_remove.is_empty()
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    if entry.file_name().to_string_lossy().starts_with('.') {
        return true;
    }
    has_hidden_attribute(entry)
}

#[cfg(windows)]
fn has_hidden_attribute(entry: &DirEntry) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    entry
        .metadata()
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
fn has_hidden_attribute(_entry: &DirEntry) -> bool {
    false
}

/// Every file below `dir`, skipping dotfiles and hidden entries.
pub fn collect_files(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(DirEntry::into_path)
        .collect()
}

fn same_parent(a: &Path, b: &Path) -> bool {
    a.parent() == b.parent()
}

/// Split `paths` into regular and version-controlled removals.
///
/// `resolve` is expected to probe fresh status. Tracked directories are expanded so
/// that untracked and modified content inside them can be reported before deleting.
pub fn classify<F>(paths: &[PathBuf], mut resolve: F) -> Result<DeletePlan, UnsafeDelete>
where
    F: FnMut(&Path) -> Option<WatcherVcResult>,
{
    let mut plan = DeletePlan::default();

    for path in paths {
        let result = match resolve(path) {
            Some(result) if result.status.is_tracked() => result,
            _ => {
                plan.regular_remove.push(path.clone());
                continue;
            }
        };

        let root = &result.root;
        if path.is_dir() {
            for file in collect_files(path) {
                let Some(rel) = root.relative(&file) else {
                    continue;
                };
                let status = root.cache().get_overlay(&rel);
                if status.is_untracked() {
                    plan.has_unknown.push(rel);
                } else if status.has_local_changes() {
                    plan.has_modification.push(rel);
                }
            }
        } else if result.status.has_local_changes() {
            plan.has_modification
                .push(root.relative(path).unwrap_or_else(|| path.clone()));
        }

        if let Some(first) = plan.vcs_remove.first() {
            let same_root = plan
                .root
                .as_ref()
                .is_some_and(|known| Arc::ptr_eq(known, root));
            if !same_parent(first, path) || !same_root {
                return Err(UnsafeDelete::DifferentDirectories);
            }
        }
        plan.root.get_or_insert_with(|| root.clone());
        plan.vcs_remove.push(path.clone());
    }

    if !plan.regular_remove.is_empty() && !plan.vcs_remove.is_empty() {
        return Err(UnsafeDelete::MixedSelection);
    }

    Ok(plan)
}
