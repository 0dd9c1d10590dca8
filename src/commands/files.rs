//! File commands that go through the dispatcher first and fall back to plain
//! filesystem operations when no backend handles them, as an editor would.

use crate::backend::VcKind;
use crate::commands::session::{absolute, CommandSession, SessionOptions};
use crate::core::error::{Result, VcsOverlayError};
use crate::core::output::{print_info, print_success};
use std::fs;
use std::path::{Path, PathBuf};

/// Deepest directory containing every path of the batch.
fn common_ancestor(paths: &[PathBuf]) -> Option<PathBuf> {
    let mut dirs = paths.iter().filter_map(|path| path.parent());
    let mut common = dirs.next()?.to_path_buf();
    for dir in dirs {
        while !dir.starts_with(&common) {
            if !common.pop() {
                break;
            }
        }
    }
    Some(common)
}

/// Where a session over `paths` is attached: the working copy holding all of them,
/// so every path of the batch is inside the project scope.
fn anchor_for(paths: &[PathBuf]) -> Option<PathBuf> {
    let common = common_ancestor(paths)?;
    let root = common
        .ancestors()
        .find(|dir| VcKind::detect(dir).is_some())
        .map(Path::to_path_buf);
    Some(root.unwrap_or(common))
}

fn session_for(paths: &[PathBuf], assume_yes: bool) -> Result<CommandSession> {
    let anchor = anchor_for(paths);
    let options = SessionOptions {
        assume_yes,
        ..SessionOptions::default()
    };
    CommandSession::open(anchor.as_deref(), options)
}

fn absolute_all(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    paths.iter().map(|path| absolute(path)).collect()
}

fn remove_plain(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Delete `paths`, through version control when the batch is versioned.
pub fn execute_rm(paths: Vec<PathBuf>, confirm: bool, assume_yes: bool) -> Result<()> {
    let paths = absolute_all(&paths)?;
    let mut session = session_for(&paths, assume_yes)?;

    if session.dispatcher.file_delete(&paths, confirm) {
        log::debug!("Delete of {} paths handled", paths.len());
    } else {
        for path in &paths {
            remove_plain(path)?;
        }
    }
    session.dispatcher.settle();

    let remaining: Vec<&PathBuf> = paths.iter().filter(|path| path.exists()).collect();
    if remaining.is_empty() {
        print_success(&format!("Deleted {} path(s)", paths.len()));
    } else {
        let names: Vec<String> = remaining.iter().map(|p| p.display().to_string()).collect();
        print_info(&format!("Kept:\n{}", names.join("\n")));
    }
    Ok(())
}

/// Move `from` to `to`, then offer to commit the move.
pub fn execute_mv(from: PathBuf, to: PathBuf, assume_yes: bool) -> Result<()> {
    let from = absolute(&from)?;
    let to = absolute(&to)?;
    let to = if to.is_dir() {
        match from.file_name() {
            Some(name) => to.join(name),
            None => to,
        }
    } else {
        to
    };
    let mut session = session_for(&[from.clone(), to.clone()], assume_yes)?;

    if !session.dispatcher.file_move(&from, &to) {
        fs::rename(&from, &to)?;
    }
    session.dispatcher.settle();

    if !to.exists() {
        print_info(&format!("{} was not moved", from.display()));
        return Ok(());
    }
    print_success(&format!("Moved {} to {}", from.display(), to.display()));

    if session.dispatcher.file_moved(&from, &to) {
        session.dispatcher.settle();
        print_success("Committed the move");
    }
    Ok(())
}

/// Commit `paths`, one commit per owning working copy.
pub fn execute_commit(message: String, paths: Vec<PathBuf>) -> Result<()> {
    let paths = absolute_all(&paths)?;
    let mut session = session_for(&paths, false)?;

    let tracked = paths.iter().any(|path| {
        session
            .dispatcher
            .resolve(path, false)
            .is_some_and(|result| result.status.is_tracked())
    });
    if !tracked {
        let first = paths.first().cloned().unwrap_or_else(|| session.root.clone());
        return Err(VcsOverlayError::not_under_version_control(first));
    }

    if session.dispatcher.commit(&paths, &message) {
        session.dispatcher.settle();
        print_success(&format!("Committed {} path(s)", paths.len()));
    }
    Ok(())
}
