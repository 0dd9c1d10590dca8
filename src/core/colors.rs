//! Unified color system for consistent overlay visualization.
//!
//! Every place the terminal host prints a status goes through this mapping, so the
//! same status always gets the same color.
//!
//! # Color Scheme
//! - **Modified**: Yellow
//! - **Added**: Green
//! - **Renamed**: Blue
//! - **Deleted**: Red
//! - **Conflicted**: Red bold
//! - **Unknown**: Cyan
//! - **Ignored / UpToDate**: Bright black (muted)

use crate::core::vc_status::VCItemStatus;
use colored::*;

/// Single function to apply color styling based on overlay status
pub fn get_status_color_style(status: VCItemStatus) -> Box<dyn Fn(&str) -> ColoredString> {
    match status {
        VCItemStatus::Unknown => Box::new(|text: &str| text.cyan()),
        VCItemStatus::Ignored => Box::new(|text: &str| text.bright_black()),
        VCItemStatus::UpToDate => Box::new(|text: &str| text.bright_black()),
        VCItemStatus::Modified => Box::new(|text: &str| text.yellow()),
        VCItemStatus::Added => Box::new(|text: &str| text.green()),
        VCItemStatus::Renamed => Box::new(|text: &str| text.blue()),
        VCItemStatus::Deleted => Box::new(|text: &str| text.red()),
        VCItemStatus::Conflicted => Box::new(|text: &str| text.red().bold()),
    }
}

/// Get colored file path using the status color
pub fn get_colored_path(status: VCItemStatus, path: &str) -> ColoredString {
    let color_fn = get_status_color_style(status);
    color_fn(path)
}

/// Format one overlay line: `M  src/main.rs (modified)`
pub fn format_overlay_line(status: VCItemStatus, path: &str) -> String {
    let color_fn = get_status_color_style(status);
    format!(
        "{}  {} {}",
        color_fn(status.as_str()),
        get_colored_path(status, path),
        format!("({})", status.description()).bright_black()
    )
}
