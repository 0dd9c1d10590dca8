//! Filesystem notifications, marshaled from the notify thread onto a channel.
//!
//! The notify callback runs on its own thread and must never touch shared state; it
//! only classifies the event and forwards it. The owner drains the channel from its
//! own thread through [`FileWatcher::drain`].

use crate::core::error::Result;
use crossbeam_channel::{Receiver, Sender};
use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileChangeKind {
    Create,
    Modify,
    Remove,
    Rename,
}

impl FileChangeKind {
    /// Reads and metadata-free access notifications carry no status change.
    pub fn classify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChangeKind::Create),
            EventKind::Modify(ModifyKind::Name(_)) => Some(FileChangeKind::Rename),
            EventKind::Modify(_) => Some(FileChangeKind::Modify),
            EventKind::Remove(_) => Some(FileChangeKind::Remove),
            EventKind::Access(_) => None,
            _ => Some(FileChangeKind::Modify),
        }
    }

    /// Changes that can create or remove a working-copy root.
    pub fn alters_layout(&self) -> bool {
        !matches!(self, FileChangeKind::Modify)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChangeEvent {
    pub path: PathBuf,
    pub kind: FileChangeKind,
}

fn forward(tx: &Sender<FileChangeEvent>, result: notify::Result<Event>) {
    let event = match result {
        Ok(event) => event,
        Err(e) => {
            log::warn!("File watch error: {e}");
            return;
        }
    };

    let Some(kind) = FileChangeKind::classify(&event.kind) else {
        return;
    };
    for path in event.paths {
        // The receiver is gone once the watcher is being dropped
        if tx.send(FileChangeEvent { path, kind }).is_err() {
            return;
        }
    }
}

pub struct FileWatcher {
    watcher: RecommendedWatcher,
    events: Receiver<FileChangeEvent>,
    watched: HashMap<PathBuf, RecursiveMode>,
}

impl FileWatcher {
    pub fn new() -> Result<Self> {
        let (tx, events) = crossbeam_channel::unbounded();
        let watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            forward(&tx, result)
        })?;

        Ok(Self {
            watcher,
            events,
            watched: HashMap::new(),
        })
    }

    /// Watch a project scope directory and everything beneath it.
    pub fn watch_tree(&mut self, path: &Path) -> Result<()> {
        self.watch(path, RecursiveMode::Recursive)
    }

    /// Watch a single directory, e.g. the metadata dir of a root outside the project.
    pub fn watch_dir(&mut self, path: &Path) -> Result<()> {
        self.watch(path, RecursiveMode::NonRecursive)
    }

    fn watch(&mut self, path: &Path, mode: RecursiveMode) -> Result<()> {
        if self.is_covered(path) {
            return Ok(());
        }

        self.watcher.watch(path, mode)?;
        self.watched.insert(path.to_path_buf(), mode);
        log::debug!("Watching {} ({mode:?})", path.display());
        Ok(())
    }

    pub fn unwatch(&mut self, path: &Path) -> Result<()> {
        if self.watched.remove(path).is_some() {
            self.watcher.unwatch(path)?;
        }
        Ok(())
    }

    /// Whether an existing watch already delivers events for `path`.
    pub fn is_covered(&self, path: &Path) -> bool {
        self.watched.iter().any(|(watched, mode)| match mode {
            RecursiveMode::Recursive => path.starts_with(watched),
            RecursiveMode::NonRecursive => {
                path == watched || path.parent() == Some(watched.as_path())
            }
        })
    }

    pub fn receiver(&self) -> &Receiver<FileChangeEvent> {
        &self.events
    }

    pub fn drain(&self) -> Vec<FileChangeEvent> {
        self.events.try_iter().collect()
    }
}
