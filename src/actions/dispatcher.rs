//! Routes editor lifecycle events through the resolver and the owning backend.
//!
//! Every handler answers "did I handle this?"; `true` tells the host to suppress its
//! default behavior. Nothing propagates out of a handler: unresolvable paths decline,
//! unsafe batches are reported to the user and suppressed, and backend failures are
//! logged, reported and suppressed.

use crate::actions::delete::{classify, DeletePlan};
use crate::actions::prompt::{preview_list, CommitAnswer, Prompter, CONFIRM_TITLE};
use crate::core::config::{RememberValue, Settings, SettingsStore};
use crate::core::error::Result;
use crate::core::project::Project;
use crate::core::vc_status::VCItemStatus;
use crate::watch::context::WatchContext;
use crate::watch::overlay::OverlaySink;
use crate::watch::resolver::{default_backend_factory, BackendFactory, VcRoot, WatcherVcResult};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const UNSAFE_DELETE_TITLE: &str = "Unsafe delete operation";
const ERROR_TITLE: &str = "Version control error";
const CONFIRM_UNVERSIONED_DELETE: &str =
    "The selection contains unversioned files that will be lost. Delete anyway?";
const CONFIRM_LOCAL_MODS_DELETE: &str =
    "The selection contains local modifications that will be lost. Delete anyway?";
const ASK_REMOVE_FROM_VCS: &str = "Would you like to remove the file(s) from version control?";
const ASK_COMMIT_AFTER_MOVE: &str = "Would you like to create a commit for this action?";

pub struct ActionDispatcher {
    context: Option<WatchContext>,
    settings_store: Arc<dyn SettingsStore>,
    settings: Settings,
    prompter: Arc<dyn Prompter>,
    sink: Arc<dyn OverlaySink>,
    factory: BackendFactory,
    /// Files created but not yet opened; the add question waits for the open.
    add_buffer: Vec<PathBuf>,
    /// Add questions shown and not yet answered, by path.
    pending_adds: HashMap<PathBuf, Arc<VcRoot>>,
}

impl ActionDispatcher {
    pub fn new(
        settings_store: Arc<dyn SettingsStore>,
        prompter: Arc<dyn Prompter>,
        sink: Arc<dyn OverlaySink>,
    ) -> Self {
        let settings = settings_store.load().unwrap_or_else(|e| {
            log::warn!("Using default settings: {e}");
            Settings::default()
        });

        Self {
            context: None,
            settings_store,
            settings,
            prompter,
            sink,
            factory: default_backend_factory(),
            add_buffer: Vec::new(),
            pending_adds: HashMap::new(),
        }
    }

    /// Replace how backends are created for discovered roots.
    pub fn with_backend_factory(mut self, factory: BackendFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Skip filesystem watching for this session, e.g. for one-shot hosts.
    pub fn without_live_updates(mut self) -> Self {
        self.settings.watch_project = false;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_attached(&self) -> bool {
        self.context.is_some()
    }

    pub fn context(&self) -> Option<&WatchContext> {
        self.context.as_ref()
    }

    // Lifecycle

    /// Create the watch context for `project`, replacing any previous one.
    pub fn attach(&mut self, project: Project) -> Result<()> {
        self.detach();
        let context = WatchContext::attach(
            project,
            &self.settings,
            self.factory.clone(),
            self.sink.clone(),
        )?;
        self.context = Some(context);
        Ok(())
    }

    pub fn detach(&mut self) {
        if let Some(context) = self.context.take() {
            context.detach();
        }
        self.add_buffer.clear();
        self.pending_adds.clear();
    }

    /// The host switched projects; reattach and replay reloads for open documents.
    pub fn project_changed(
        &mut self,
        project: Option<Project>,
        open_documents: &[PathBuf],
    ) -> bool {
        self.detach();
        if let Some(project) = project {
            if let Err(e) = self.attach(project) {
                log::error!("Cannot attach to project: {e}");
                return false;
            }
        }

        for document in open_documents {
            self.file_reload(document);
        }
        false
    }

    pub fn selection_changed(&mut self, visible: Vec<PathBuf>) -> bool {
        if let Some(context) = self.context.as_mut() {
            context.selection_changed(visible);
        }
        false
    }

    pub fn force_refresh(&mut self) {
        if let Some(context) = self.context.as_mut() {
            context.force_refresh();
        }
    }

    /// Drain watcher events and finished refreshes; call on the owner thread.
    pub fn pump(&mut self) -> usize {
        self.context.as_mut().map(WatchContext::pump).unwrap_or(0)
    }

    /// Block until queued refreshes are applied.
    pub fn settle(&mut self) -> usize {
        self.context.as_mut().map(WatchContext::settle).unwrap_or(0)
    }

    /// Overlay for `path` as the tree view would show it.
    pub fn overlay_of(&mut self, path: &Path) -> Option<VCItemStatus> {
        Some(self.context.as_mut()?.overlay_of(path))
    }

    pub fn resolve(&mut self, path: &Path, use_cache: bool) -> Option<WatcherVcResult> {
        self.context.as_mut()?.resolve(path, use_cache)
    }

    // Helpers

    /// Resolution that only succeeds for paths the backend tracks.
    fn tracked(&mut self, path: &Path, use_cache: bool) -> Option<WatcherVcResult> {
        self.resolve(path, use_cache)
            .filter(|result| result.status.is_tracked())
    }

    fn finish(&mut self, action: &str, path: &Path, outcome: Result<bool>) -> bool {
        match outcome {
            Ok(handled) => {
                if handled {
                    log::debug!("{action} of {} handled by backend", path.display());
                    if let Some(context) = self.context.as_mut() {
                        context.refresh_root_of(path);
                    }
                }
                handled
            }
            Err(e) => {
                log::error!("{action} of {} failed: {e}", path.display());
                self.prompter
                    .alert(ERROR_TITLE, &format!("{action} of {} failed:\n{e}", path.display()));
                true
            }
        }
    }

    fn persist_settings(&self) {
        if let Err(e) = self.settings_store.save(&self.settings) {
            log::warn!("Cannot save settings: {e}");
        }
    }

    // File actions

    pub fn file_before_rename(&mut self, path: &Path) -> bool {
        let Some(result) = self.tracked(path, false) else {
            return false;
        };
        let outcome = result.backend().file_before_rename(path);
        self.finish("Rename", path, outcome)
    }

    pub fn file_rename(&mut self, from: &Path, to: &Path) -> bool {
        let Some(result) = self.tracked(from, false) else {
            return false;
        };
        let outcome = result.backend().file_rename(from, to);
        self.finish("Rename", from, outcome)
    }

    /// Both ends must be tracked; a destination that does not exist yet is judged by
    /// its directory.
    pub fn file_move(&mut self, from: &Path, to: &Path) -> bool {
        let Some(source) = self.tracked(from, false) else {
            return false;
        };
        let destination = if to.exists() {
            to
        } else {
            to.parent().unwrap_or(to)
        };
        if self.tracked(destination, false).is_none() {
            log::debug!("Move target {} is not under version control", to.display());
            return false;
        }

        let outcome = source.backend().file_move(from, to);
        self.finish("Move", from, outcome)
    }

    /// After a completed move, offer to commit the destination.
    ///
    /// Returns true when a commit was made.
    pub fn file_moved(&mut self, from: &Path, to: &Path) -> bool {
        let Some(result) = self.tracked(to, false) else {
            return false;
        };
        if self.settings.commit_after_move == RememberValue::No {
            return false;
        }

        let (from_rel, to_rel) = match self.context.as_ref() {
            Some(context) => (
                context.project().relative_path(from),
                context.project().relative_path(to),
            ),
            None => (from.to_path_buf(), to.to_path_buf()),
        };
        let default_message = format!("Moved {} to {}", from_rel.display(), to_rel.display());

        let message = match self.settings.commit_after_move {
            RememberValue::Yes => default_message,
            _ => match self.prompter.ask_commit_message(
                CONFIRM_TITLE,
                ASK_COMMIT_AFTER_MOVE,
                &default_message,
            ) {
                CommitAnswer::Commit(message) if !message.trim().is_empty() => message,
                CommitAnswer::Never => {
                    self.settings.commit_after_move = RememberValue::No;
                    self.persist_settings();
                    return false;
                }
                _ => return false,
            },
        };

        let outcome = result
            .backend()
            .commit(&[to.to_path_buf()], &message)
            .map(|_| true);
        self.finish("Commit", to, outcome)
    }

    /// Remove a batch; see [`classify`] for how the batch is split.
    pub fn file_delete(&mut self, paths: &[PathBuf], confirm: bool) -> bool {
        if paths.is_empty() {
            return false;
        }
        let Some(context) = self.context.as_mut() else {
            return false;
        };

        let plan = match classify(paths, |path| context.resolve(path, false)) {
            Ok(plan) => plan,
            Err(unsafe_delete) => {
                log::warn!("Refusing delete: {unsafe_delete}");
                self.prompter
                    .alert(UNSAFE_DELETE_TITLE, &unsafe_delete.to_string());
                return true;
            }
        };

        if plan.is_regular() {
            return false;
        }
        if !confirm {
            // The host already decided; nothing to ask and nothing for the backend
            return false;
        }
        if !self.confirm_losses(&plan) {
            return true;
        }

        let remove = match self.settings.should_delete {
            RememberValue::Yes => true,
            RememberValue::No => false,
            RememberValue::Ask => {
                let answer = self.prompter.ask_remember(CONFIRM_TITLE, ASK_REMOVE_FROM_VCS);
                if answer.remember {
                    self.settings.should_delete = if answer.accepted {
                        RememberValue::Yes
                    } else {
                        RememberValue::No
                    };
                    self.persist_settings();
                }
                answer.accepted
            }
        };
        if !remove {
            return true;
        }

        let Some(root) = plan.root.as_ref() else {
            return true;
        };
        let outcome = root.backend().file_delete(&plan.vcs_remove, confirm);
        self.finish("Delete", &plan.vcs_remove[0], outcome)
    }

    fn confirm_losses(&self, plan: &DeletePlan) -> bool {
        let listing = |paths: &[PathBuf]| {
            let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            preview_list(&names)
        };

        if !plan.has_unknown.is_empty() {
            let message = format!("{CONFIRM_UNVERSIONED_DELETE}\n\n{}", listing(&plan.has_unknown));
            if !self.prompter.confirm(CONFIRM_TITLE, &message) {
                return false;
            }
        }
        if !plan.has_modification.is_empty() {
            let message = format!(
                "{CONFIRM_LOCAL_MODS_DELETE}\n\n{}",
                listing(&plan.has_modification)
            );
            if !self.prompter.confirm(CONFIRM_TITLE, &message) {
                return false;
            }
        }
        true
    }

    /// Remember a newly created file; it is offered for adding once opened.
    pub fn file_new(&mut self, path: &Path) -> bool {
        if self.context.is_some() && !self.add_buffer.iter().any(|p| p == path) {
            self.add_buffer.push(path.to_path_buf());
        }
        false
    }

    pub fn file_open(&mut self, path: &Path) -> bool {
        let was_new = match self.add_buffer.iter().position(|p| p == path) {
            Some(index) => {
                self.add_buffer.remove(index);
                true
            }
            None => false,
        };

        let Some(result) = self.resolve(path, true) else {
            return false;
        };

        if was_new && result.status == VCItemStatus::Unknown {
            self.pending_adds
                .insert(path.to_path_buf(), result.root.clone());
            self.prompter.ask_add_to_version_control(path);
        }

        if !result.status.is_tracked() {
            return false;
        }
        let outcome = result.backend().file_open(path);
        self.finish("Open", path, outcome)
    }

    /// The user answered a pending "add to version control?" question.
    ///
    /// Returns true when the file was added.
    pub fn resolve_add_prompt(&mut self, path: &Path, accepted: bool) -> bool {
        let Some(root) = self.pending_adds.remove(path) else {
            log::debug!("No pending add question for {}", path.display());
            return false;
        };
        if !accepted {
            return false;
        }

        let outcome = root.backend().file_new(path);
        let added = matches!(outcome, Ok(true));
        self.finish("Add", path, outcome);
        self.force_refresh();
        added
    }

    pub fn file_reload(&mut self, path: &Path) -> bool {
        let Some(result) = self.tracked(path, true) else {
            return false;
        };
        let outcome = result.backend().file_reload(path);
        self.finish("Reload", path, outcome)
    }

    pub fn file_modify_read_only(&mut self, path: &Path) -> bool {
        let Some(result) = self.tracked(path, true) else {
            return false;
        };
        let outcome = result.backend().file_modify_read_only(path);
        self.finish("Make writable", path, outcome)
    }

    fn output_path(&self) -> Option<PathBuf> {
        self.context
            .as_ref()
            .map(|context| context.project().output_path_absolute())
    }

    pub fn build_project(&mut self) -> bool {
        let Some(output) = self.output_path() else {
            return false;
        };
        let Some(result) = self.tracked(&output, true) else {
            return false;
        };
        let outcome = result.backend().build_project();
        self.finish("Build", &output, outcome)
    }

    pub fn test_project(&mut self) -> bool {
        let Some(output) = self.output_path() else {
            return false;
        };
        let Some(result) = self.tracked(&output, true) else {
            return false;
        };
        let outcome = result.backend().test_project();
        self.finish("Test", &output, outcome)
    }

    pub fn save_project(&mut self, file_name: &Path) -> bool {
        let Some(result) = self.tracked(file_name, true) else {
            return false;
        };
        let outcome = result.backend().save_project();
        self.finish("Save", file_name, outcome)
    }

    /// Commit `paths` with `message`, one commit per owning root.
    pub fn commit(&mut self, paths: &[PathBuf], message: &str) -> bool {
        let mut by_root: BTreeMap<PathBuf, (Arc<VcRoot>, Vec<PathBuf>)> = BTreeMap::new();
        for path in paths {
            match self.tracked(path, false) {
                Some(result) => {
                    by_root
                        .entry(result.root.path().to_path_buf())
                        .or_insert_with(|| (result.root.clone(), Vec::new()))
                        .1
                        .push(path.clone());
                }
                None => log::warn!("{} is not under version control", path.display()),
            }
        }

        let mut committed = false;
        for (root_path, (root, root_paths)) in by_root {
            let outcome = root.backend().commit(&root_paths, message).map(|_| true);
            committed |= self.finish("Commit", &root_path, outcome);
        }
        committed
    }
}

impl Drop for ActionDispatcher {
    fn drop(&mut self) {
        self.detach();
    }
}
