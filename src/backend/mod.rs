//! Backend adapters: one per version-control kind, behind a common capability interface.
//!
//! A backend is selected once, when its root is discovered, and is then shared by the
//! resolver, the refresh worker and the dispatcher. Status output of every backend is
//! normalized into a [`StatusMap`] keyed by root-relative paths.
//!
//! # Public API
//! - [`VcKind`]: Supported systems and their metadata markers
//! - [`FileActions`]: Editor file-action hooks, each answering "did I perform it?"
//! - [`VcBackend`]: Status queries plus commit on top of the file actions

mod command;
#[cfg(test)]
pub(crate) mod fake;
pub mod git;
pub mod hg;
pub mod svn;

pub use command::VcsCommand;
pub use git::GitBackend;
pub use hg::MercurialBackend;
pub use svn::SubversionBackend;

use crate::core::error::Result;
use crate::core::vc_status::VCItemStatus;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Root-relative path to status, as produced by a bulk status query.
///
/// Only entries that differ from "tracked and clean" are listed; untracked or ignored
/// directories appear once, collapsed.
pub type StatusMap = BTreeMap<PathBuf, VCItemStatus>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VcKind {
    Git,
    Subversion,
    Mercurial,
}

impl VcKind {
    pub const ALL: [VcKind; 3] = [VcKind::Git, VcKind::Subversion, VcKind::Mercurial];

    /// Name of the metadata entry marking a working-copy root.
    pub fn metadata_dir(&self) -> &'static str {
        match self {
            VcKind::Git => ".git",
            VcKind::Subversion => ".svn",
            VcKind::Mercurial => ".hg",
        }
    }

    /// Kind whose metadata entry exists directly inside `dir`.
    pub fn detect(dir: &Path) -> Option<VcKind> {
        Self::ALL
            .into_iter()
            .find(|kind| dir.join(kind.metadata_dir()).exists())
    }

    pub fn create_backend(&self, root: &Path) -> Arc<dyn VcBackend> {
        match self {
            VcKind::Git => Arc::new(GitBackend::new(root)),
            VcKind::Subversion => Arc::new(SubversionBackend::new(root)),
            VcKind::Mercurial => Arc::new(MercurialBackend::new(root)),
        }
    }
}

impl fmt::Display for VcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VcKind::Git => write!(f, "git"),
            VcKind::Subversion => write!(f, "svn"),
            VcKind::Mercurial => write!(f, "hg"),
        }
    }
}

/// Editor file-action hooks.
///
/// Each returns `Ok(true)` when the backend performed the operation itself, which
/// suppresses the editor's default behavior. The defaults decline.
pub trait FileActions {
    /// Put a new file under version control.
    fn file_new(&self, _path: &Path) -> Result<bool> {
        Ok(false)
    }

    fn file_open(&self, _path: &Path) -> Result<bool> {
        Ok(false)
    }

    fn file_reload(&self, _path: &Path) -> Result<bool> {
        Ok(false)
    }

    fn file_modify_read_only(&self, _path: &Path) -> Result<bool> {
        Ok(false)
    }

    fn file_before_rename(&self, _path: &Path) -> Result<bool> {
        Ok(false)
    }

    fn file_rename(&self, _from: &Path, _to: &Path) -> Result<bool> {
        Ok(false)
    }

    fn file_move(&self, _from: &Path, _to: &Path) -> Result<bool> {
        Ok(false)
    }

    fn file_delete(&self, _paths: &[PathBuf], _confirm: bool) -> Result<bool> {
        Ok(false)
    }

    fn build_project(&self) -> Result<bool> {
        Ok(false)
    }

    fn test_project(&self) -> Result<bool> {
        Ok(false)
    }

    fn save_project(&self) -> Result<bool> {
        Ok(false)
    }
}

/// A version-control backend bound to one working-copy root.
pub trait VcBackend: FileActions + Send + Sync + fmt::Debug {
    fn kind(&self) -> VcKind;

    fn root(&self) -> &Path;

    /// Status of every non-clean path under the root.
    fn bulk_status(&self) -> Result<StatusMap>;

    /// Fresh status of a single absolute path.
    fn path_status(&self, path: &Path) -> Result<VCItemStatus>;

    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()>;
}

/// `path` relative to `root`, as used for cache keys and tool arguments.
pub fn relative_to(root: &Path, path: &Path) -> Result<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| crate::core::error::VcsOverlayError::outside_root(path, root))
}

/// Delete whatever a backend removal left on disk; the editor expects the paths gone.
pub(crate) fn remove_leftovers(paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        if path.is_dir() {
            std::fs::remove_dir_all(path)?;
        } else if path.exists() {
            std::fs::remove_file(path)?;
        }
    }
    Ok(())
}
