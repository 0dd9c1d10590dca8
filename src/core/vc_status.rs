//! Ordered version-control item status shared by every backend.
//!
//! This module defines [`VCItemStatus`], the one status vocabulary every backend maps its
//! native output into. The variant order is significant: anything strictly above
//! [`VCItemStatus::UpToDate`] carries local changes, anything strictly above
//! [`VCItemStatus::Ignored`] is tracked, and a directory's overlay is the maximum of its
//! descendants.
//!
//! # Key Features
//! - **Total ordering**: `derive(PartialOrd, Ord)` follows declaration order
//! - **git2 integration**: Direct conversion from `git2::Status` flags
//! - **Single-letter codes**: Compact display used by the terminal host

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single file or folder inside a version-control root.
///
/// Declaration order is the severity order used for comparisons and aggregation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum VCItemStatus {
    /// Not known to the backend (untracked)
    #[default]
    Unknown,
    /// Explicitly ignored by the backend
    Ignored,
    /// Tracked and clean
    UpToDate,
    /// Tracked with local content changes
    Modified,
    /// Scheduled for addition
    Added,
    /// Moved or renamed in the index
    Renamed,
    /// Scheduled for removal or missing from disk
    Deleted,
    /// Merge conflict
    Conflicted,
}

impl VCItemStatus {
    /// Convert git2 status flags into the most severe matching status.
    pub fn from_git2(flags: git2::Status) -> VCItemStatus {
        if flags.contains(git2::Status::CONFLICTED) {
            return VCItemStatus::Conflicted;
        }
        if flags.contains(git2::Status::IGNORED) {
            return VCItemStatus::Ignored;
        }
        if flags.intersects(git2::Status::INDEX_DELETED | git2::Status::WT_DELETED) {
            return VCItemStatus::Deleted;
        }
        if flags.intersects(git2::Status::INDEX_RENAMED | git2::Status::WT_RENAMED) {
            return VCItemStatus::Renamed;
        }
        if flags.contains(git2::Status::INDEX_NEW) {
            return VCItemStatus::Added;
        }
        if flags.intersects(
            git2::Status::INDEX_MODIFIED
                | git2::Status::WT_MODIFIED
                | git2::Status::INDEX_TYPECHANGE
                | git2::Status::WT_TYPECHANGE,
        ) {
            return VCItemStatus::Modified;
        }
        // WT_NEW without INDEX_NEW: untracked
        if flags.contains(git2::Status::WT_NEW) {
            return VCItemStatus::Unknown;
        }

        VCItemStatus::UpToDate
    }

    /// Single-letter code for compact display
    pub fn as_str(&self) -> &'static str {
        match self {
            VCItemStatus::Unknown => "?",
            VCItemStatus::Ignored => "I",
            VCItemStatus::UpToDate => " ",
            VCItemStatus::Modified => "M",
            VCItemStatus::Added => "A",
            VCItemStatus::Renamed => "R",
            VCItemStatus::Deleted => "D",
            VCItemStatus::Conflicted => "C",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            VCItemStatus::Unknown => "untracked",
            VCItemStatus::Ignored => "ignored",
            VCItemStatus::UpToDate => "up to date",
            VCItemStatus::Modified => "modified",
            VCItemStatus::Added => "added",
            VCItemStatus::Renamed => "renamed",
            VCItemStatus::Deleted => "deleted",
            VCItemStatus::Conflicted => "conflicted",
        }
    }

    /// True for every status above `UpToDate`
    pub fn has_local_changes(&self) -> bool {
        *self > VCItemStatus::UpToDate
    }

    /// True for every status above `Ignored`
    pub fn is_tracked(&self) -> bool {
        *self > VCItemStatus::Ignored
    }

    /// Untracked or ignored; descendants of such a directory inherit it.
    pub fn is_untracked(&self) -> bool {
        matches!(self, VCItemStatus::Unknown | VCItemStatus::Ignored)
    }
}

impl fmt::Display for VCItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
