//! Core building blocks shared by the engine and the terminal host.
//!
//! This module provides the status model, error handling, persisted settings, the
//! project description and terminal output formatting.

pub mod colors;
pub mod config;
pub mod dirs;
pub mod error;
pub mod output;
pub mod project;
pub mod vc_status;

// === Error handling ===
// Core error types and result type used throughout the engine
pub use error::{Result, VcsOverlayError};

// === Status model ===
// Ordered overlay status, from untracked to conflicted
pub use vc_status::VCItemStatus;

// === Settings ===
// Remembered answers and watcher tuning, persisted as JSON
pub use config::{JsonSettingsStore, MemorySettingsStore, RememberValue, Settings, SettingsStore};

// === Project ===
// The tree the host shows and the paths it covers
pub use project::Project;

// === Color system ===
// Unified status coloring for terminal output
pub use colors::{format_overlay_line, get_colored_path, get_status_color_style};

// === Output formatting ===
// Unified output formatting for consistent CLI presentation
pub use output::{print_error, print_info, print_section_header, print_success, print_warning};
