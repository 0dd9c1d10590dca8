//! Shared setup for terminal commands.
//!
//! Every command attaches an [`ActionDispatcher`] to a directory, the way an editor
//! attaches to a project, and then drives it like a host would.
//!
//! # Initialization Steps
//! 1. **Project root**: the given directory, or the current one
//! 2. **Settings**: loaded from the JSON store in the config directory
//! 3. **Attach**: discover roots and load their status
//! 4. **Validation**: fail when no root covers the project

use crate::actions::dispatcher::ActionDispatcher;
use crate::commands::terminal::TerminalPrompter;
use crate::core::config::{JsonSettingsStore, MemorySettingsStore, Settings, SettingsStore};
use crate::core::error::{Result, VcsOverlayError};
use crate::core::project::Project;
use crate::watch::overlay::{NullOverlaySink, OverlaySink};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct CommandSession {
    pub dispatcher: ActionDispatcher,
    pub root: PathBuf,
}

/// Options controlling how a session is attached.
#[derive(Default)]
pub struct SessionOptions {
    pub assume_yes: bool,
    pub live_updates: bool,
    pub sink: Option<Arc<dyn OverlaySink>>,
}

impl CommandSession {
    pub fn open(dir: Option<&Path>, options: SessionOptions) -> Result<Self> {
        let root = match dir {
            Some(dir) => absolute(dir)?,
            None => env::current_dir()?.canonicalize()?,
        };
        let root = if root.is_dir() {
            root
        } else {
            root.parent().map(Path::to_path_buf).unwrap_or(root)
        };

        let store: Arc<dyn SettingsStore> = match JsonSettingsStore::in_config_directory() {
            Ok(store) => Arc::new(store),
            Err(e) => {
                log::warn!("Settings will not be saved: {e}");
                Arc::new(MemorySettingsStore::new(Settings::default()))
            }
        };
        let sink = options
            .sink
            .unwrap_or_else(|| Arc::new(NullOverlaySink) as Arc<dyn OverlaySink>);
        let prompter = Arc::new(TerminalPrompter::new(options.assume_yes));
        let mut dispatcher = ActionDispatcher::new(store, prompter, sink);
        if !options.live_updates {
            dispatcher = dispatcher.without_live_updates();
        }

        dispatcher.attach(Project::new(&root))?;
        let has_roots = dispatcher
            .context()
            .is_some_and(|context| !context.roots().is_empty());
        if !has_roots {
            return Err(VcsOverlayError::not_under_version_control(&root));
        }

        dispatcher.settle();
        Ok(Self { dispatcher, root })
    }
}

/// Absolute, symlink-free form of `path`; the file itself need not exist yet.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.canonicalize()?);
    }

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.canonicalize()?,
        _ => env::current_dir()?.canonicalize()?,
    };
    match path.file_name() {
        Some(name) => Ok(parent.join(name)),
        None => Ok(parent),
    }
}
