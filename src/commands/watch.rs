use crate::backend::VcKind;
use crate::commands::session::{absolute, CommandSession, SessionOptions};
use crate::commands::terminal::PrintingSink;
use crate::core::error::Result;
use crate::core::output::print_info;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const MAX_IDLE: Duration = Duration::from_millis(200);

/// Show overlays for the entries of `dir` and print every change as it happens.
///
/// Runs until `seconds` elapse, or forever without a limit.
pub fn execute_watch(dir: Option<PathBuf>, seconds: Option<u64>) -> Result<()> {
    let dir = match dir.as_deref() {
        Some(dir) => absolute(dir)?,
        None => env::current_dir()?.canonicalize()?,
    };
    let options = SessionOptions {
        live_updates: true,
        sink: Some(Arc::new(PrintingSink::new(dir.clone()))),
        ..SessionOptions::default()
    };
    let mut session = CommandSession::open(Some(&dir), options)?;

    let visible = visible_entries(&session.root)?;
    print_info(&format!(
        "Watching {} ({} entries), press Ctrl-C to stop",
        session.root.display(),
        visible.len()
    ));
    session.dispatcher.selection_changed(visible);

    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s));
    loop {
        session.dispatcher.pump();
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }

        let idle = session
            .dispatcher
            .context()
            .and_then(|context| context.next_deadline())
            .map_or(MAX_IDLE, |wait| wait.min(MAX_IDLE));
        thread::sleep(idle);
    }
    Ok(())
}

/// Immediate children of `dir`, the way a tree view would list them.
fn visible_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_metadata = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| VcKind::ALL.iter().any(|k| k.metadata_dir() == name));
        if !is_metadata {
            entries.push(path);
        }
    }
    entries.sort();
    Ok(entries)
}
