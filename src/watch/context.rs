//! Everything the engine keeps for one attached project.

use crate::backend::VcKind;
use crate::core::config::Settings;
use crate::core::error::Result;
use crate::core::project::Project;
use crate::core::vc_status::VCItemStatus;
use crate::watch::debouncer::Debouncer;
use crate::watch::overlay::{overlay_for, OverlayManager, OverlaySink};
use crate::watch::refresh::RefreshWorker;
use crate::watch::resolver::{BackendFactory, RootResolver, VcRoot, WatcherVcResult};
use crate::watch::watcher::{FileChangeEvent, FileWatcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub struct WatchContext {
    project: Project,
    resolver: RootResolver,
    watcher: Option<FileWatcher>,
    worker: RefreshWorker,
    debouncer: Debouncer,
    overlays: OverlayManager,
}

impl WatchContext {
    /// Start tracking `project`: watch its scope and discover its roots.
    ///
    /// A watcher that cannot be created only costs live updates; the context still
    /// answers queries and refreshes on demand.
    pub fn attach(
        project: Project,
        settings: &Settings,
        factory: BackendFactory,
        sink: Arc<dyn OverlaySink>,
    ) -> Result<Self> {
        let scopes = project.scope_paths();
        let watcher = if settings.watch_project {
            match Self::watch_scopes(&scopes) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    log::warn!("Live updates disabled for {}: {e}", project.root.display());
                    None
                }
            }
        } else {
            None
        };

        let mut context = Self {
            resolver: RootResolver::new(scopes.clone(), factory),
            watcher,
            worker: RefreshWorker::spawn()?,
            debouncer: Debouncer::new(settings.debounce_ms),
            overlays: OverlayManager::new(sink),
            project,
        };

        for scope in &scopes {
            context.resolver.resolve(scope, true);
        }
        context.adopt_discovered_roots();
        log::info!("Attached to {}", context.project.root.display());
        Ok(context)
    }

    fn watch_scopes(scopes: &[PathBuf]) -> Result<FileWatcher> {
        let mut watcher = FileWatcher::new()?;
        for scope in scopes {
            watcher.watch_tree(scope)?;
        }
        Ok(watcher)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn resolve(&mut self, path: &Path, use_cache: bool) -> Option<WatcherVcResult> {
        let result = self.resolver.resolve(path, use_cache);
        self.adopt_discovered_roots();
        result
    }

    pub fn overlay_of(&mut self, path: &Path) -> VCItemStatus {
        let status = overlay_for(&mut self.resolver, path);
        self.adopt_discovered_roots();
        status
    }

    pub fn roots(&self) -> Vec<Arc<VcRoot>> {
        self.resolver.roots().cloned().collect()
    }

    pub fn overlays(&self) -> &OverlayManager {
        &self.overlays
    }

    pub fn selection_changed(&mut self, visible: Vec<PathBuf>) {
        self.overlays.selection_changed(&mut self.resolver, visible);
        self.adopt_discovered_roots();
    }

    /// Invalidate every root and queue a bulk query for each.
    pub fn force_refresh(&mut self) {
        for root in self.roots() {
            root.cache().invalidate_all();
            self.schedule(&root);
        }
    }

    /// Queue a bulk query for the root owning `path`, after a mutating action.
    pub fn refresh_root_of(&mut self, path: &Path) {
        if let Some(root) = self.resolver.known_root_for(path) {
            let rel = root.relative(path).unwrap_or_default();
            root.cache().invalidate(&rel);
            self.schedule(&root);
        }
    }

    /// Process pending notifications, settled roots and finished queries.
    ///
    /// Must be called from the thread that owns the context; returns the number of
    /// caches that changed.
    pub fn pump(&mut self) -> usize {
        let events = self
            .watcher
            .as_ref()
            .map(FileWatcher::drain)
            .unwrap_or_default();
        for event in events {
            self.handle_event(event);
        }

        for root_path in self.debouncer.take_ready() {
            let root = self.roots().into_iter().find(|r| r.path() == root_path);
            if let Some(root) = root.filter(|r| r.cache().is_dirty()) {
                self.schedule(&root);
            }
        }

        let applied = self.worker.drain_results();
        self.overlays.roots_updated(&mut self.resolver, &applied);
        applied.len()
    }

    /// Wait for queued queries and apply them; for one-shot hosts.
    pub fn settle(&mut self) -> usize {
        let applied = self.worker.wait_idle();
        self.overlays.roots_updated(&mut self.resolver, &applied);
        applied.len()
    }

    /// How long the owner may sleep before the next pump is due.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.debouncer.next_deadline()
    }

    fn handle_event(&mut self, event: FileChangeEvent) {
        if event.kind.alters_layout() {
            self.forget_layout(&event.path);
        }

        let Some(root) = self.resolver.known_root_for(&event.path) else {
            return;
        };

        if root.is_metadata_path(&event.path) {
            // Commits, checkouts and index writes can change any path in the root
            root.cache().invalidate_all();
        } else if let Some(rel) = root.relative(&event.path) {
            root.cache().invalidate(&rel);
        }
        self.debouncer.record(root.path());
    }

    fn forget_layout(&mut self, path: &Path) {
        let is_metadata = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| VcKind::ALL.iter().any(|k| k.metadata_dir() == name));
        let scope = match path.parent() {
            Some(parent) if is_metadata => parent,
            _ => path,
        };

        for root in self.resolver.forget(scope) {
            self.debouncer.remove(root.path());
            if let Some(watcher) = self.watcher.as_mut() {
                if let Err(e) = watcher.unwatch(&root.metadata_path()) {
                    log::debug!("Unwatch of {} failed: {e}", root.path().display());
                }
            }
        }

        // A new metadata directory is picked up on the next resolve
        if is_metadata {
            self.resolver.resolve(scope, true);
            self.adopt_discovered_roots();
        }
    }

    fn adopt_discovered_roots(&mut self) {
        for root in self.resolver.take_discovered() {
            if let Some(watcher) = self.watcher.as_mut() {
                let metadata = root.metadata_path();
                if !watcher.is_covered(&metadata) && metadata.is_dir() {
                    if let Err(e) = watcher.watch_dir(&metadata) {
                        log::warn!("Cannot watch {}: {e}", metadata.display());
                    }
                }
            }
            self.schedule(&root);
        }
    }

    fn schedule(&mut self, root: &Arc<VcRoot>) {
        if let Err(e) = self.worker.submit(root) {
            log::error!("Cannot queue refresh of {}: {e}", root.path().display());
        }
    }

    /// Stop watching and drop every cache.
    pub fn detach(mut self) {
        self.overlays.reset();
        self.resolver.clear();
        log::info!("Detached from {}", self.project.root.display());
    }
}
