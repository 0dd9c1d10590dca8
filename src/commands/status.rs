use crate::backend::StatusMap;
use crate::commands::session::{absolute, CommandSession, SessionOptions};
use crate::core::colors::{format_overlay_line, get_colored_path};
use crate::core::error::Result;
use crate::core::output::{print_section_header, print_success};
use crate::core::vc_status::VCItemStatus;
use colored::*;
use std::path::{Path, PathBuf};

/// Print the overlay of every changed path under `path`, grouped by root.
pub fn execute_status(path: Option<PathBuf>) -> Result<()> {
    let target = match path.as_deref() {
        Some(path) => Some(absolute(path)?),
        None => None,
    };
    let mut session = CommandSession::open(target.as_deref(), SessionOptions::default())?;
    let target = target.unwrap_or_else(|| session.root.clone());

    let overall = session
        .dispatcher
        .overlay_of(&target)
        .unwrap_or(VCItemStatus::Unknown);

    let roots = session
        .dispatcher
        .context()
        .map(|context| context.roots())
        .unwrap_or_default();

    let mut changed = 0;
    for root in roots {
        let snapshot = root.cache().snapshot();
        let lines = changed_entries(root.path(), snapshot.entries(), &target);
        if lines.is_empty() {
            continue;
        }

        print_section_header(&format!("{} ({})", root.path().display(), root.kind()));
        for (shown, status) in &lines {
            println!("{}", format_overlay_line(*status, shown));
        }
        changed += lines.len();
    }

    if changed == 0 {
        print_success("Nothing to report, working copy is clean");
    } else {
        println!(
            "\n{} {}\n",
            "Overall:".bright_black(),
            get_colored_path(overall, overall.description())
        );
    }
    Ok(())
}

/// Entries under `target` worth showing, as paths relative to `target`.
fn changed_entries(
    root: &Path,
    entries: &StatusMap,
    target: &Path,
) -> Vec<(String, VCItemStatus)> {
    entries
        .iter()
        .filter(|(_, status)| !matches!(status, VCItemStatus::Ignored | VCItemStatus::UpToDate))
        .filter_map(|(rel, status)| {
            let abs = root.join(rel);
            let shown = abs.strip_prefix(target).ok()?;
            let shown = if shown.as_os_str().is_empty() {
                ".".to_string()
            } else {
                shown.display().to_string()
            };
            Some((shown, *status))
        })
        .collect()
}
