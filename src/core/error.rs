//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`VcsOverlayError`] which covers every failure the overlay engine
//! can run into internally. It uses `thiserror` for ergonomic error definitions and
//! includes specialized constructors for the common failure scenarios.
//!
//! Errors never cross the editor boundary: the dispatcher turns every one of them into a
//! "handled / not handled" decision. They exist so that backends, the settings store and
//! the watcher can report precisely what went wrong to the log.
//!
//! # Public API
//! - [`VcsOverlayError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, VcsOverlayError>`
//!
//! # Error Categories
//! - **Resolution**: path outside every known root, no project attached
//! - **Backend**: git2 library errors, external tool failures, unparsable output
//! - **Settings**: config directory, read/parse/write failures
//! - **Watcher**: notify errors, closed channels

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for vcs-overlay
#[derive(Error, Debug)]
pub enum VcsOverlayError {
    // Resolution errors
    #[error("Path is not under version control: {path}")]
    NotUnderVersionControl { path: PathBuf },

    #[error("Path {path} is not inside root {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    // Backend errors
    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("Invalid UTF-8 path in repository")]
    InvalidUtf8Path,

    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("Could not launch {program}: {source}")]
    CommandSpawnFailed {
        program: String,
        source: std::io::Error,
    },

    #[error("Unexpected status output from {program}: {line}")]
    UnparsableStatus { program: String, line: String },

    // File operation errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Settings errors
    #[error("Could not find config directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read settings file '{path}': {source}")]
    SettingsReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings file '{path}': {source}")]
    SettingsParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write settings file '{path}': {source}")]
    SettingsWriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Watcher errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("Channel closed unexpectedly")]
    ChannelClosed,
}

/// Convenience type alias for Results using VcsOverlayError
pub type Result<T> = std::result::Result<T, VcsOverlayError>;

impl VcsOverlayError {
    /// Create a not-under-version-control error
    pub fn not_under_version_control(path: impl Into<PathBuf>) -> Self {
        Self::NotUnderVersionControl { path: path.into() }
    }

    /// Create an outside-root error
    pub fn outside_root(path: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self::OutsideRoot {
            path: path.into(),
            root: root.into(),
        }
    }

    /// Create a command failed error from the tool's stderr
    pub fn command_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a command spawn failed error
    pub fn command_spawn_failed(program: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandSpawnFailed {
            program: program.into(),
            source,
        }
    }

    /// Create an unparsable status line error
    pub fn unparsable_status(program: impl Into<String>, line: impl Into<String>) -> Self {
        Self::UnparsableStatus {
            program: program.into(),
            line: line.into(),
        }
    }

    /// Create a settings read failed error
    pub fn settings_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SettingsReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a settings parse failed error
    pub fn settings_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::SettingsParseFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a settings write failed error
    pub fn settings_write_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SettingsWriteFailed {
            path: path.into(),
            source,
        }
    }
}
