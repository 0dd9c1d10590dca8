//! vcs-overlay - Version-control status overlays and file actions for editor project trees.
//!
//! The engine decorates every path of a project with the status its version-control
//! system reports and routes editor file actions (create, rename, move, delete, commit)
//! through the owning backend. Git, Subversion and Mercurial working copies are found
//! automatically, cached per root and kept current by a filesystem watcher.
//!
//! # Public API
//! - [`ActionDispatcher`]: The editor-facing surface, one handler per lifecycle event
//! - [`WatchContext`]: Root discovery, status caches and live refresh for one project
//! - [`VcBackend`]: Per-system adapters for status queries and file actions
//! - [`VCItemStatus`]: The ordered overlay status shared by every layer

pub mod actions;
pub mod backend;
pub mod commands;
pub mod core;
pub mod watch;

pub use actions::{ActionDispatcher, CommitAnswer, Prompter, RememberAnswer};
pub use backend::{FileActions, StatusMap, VcBackend, VcKind};
pub use crate::core::{
    // Settings
    JsonSettingsStore,
    MemorySettingsStore,
    // Project description
    Project,
    RememberValue,
    // Error handling
    Result,
    Settings,
    SettingsStore,
    // Status model
    VCItemStatus,
    VcsOverlayError,
};
pub use watch::{OverlaySink, OverlayUpdate, VcRoot, WatchContext, WatcherVcResult};
