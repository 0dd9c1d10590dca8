//! Keeps the overlays of visible tree items in sync with the status caches.

use crate::core::vc_status::VCItemStatus;
use crate::watch::resolver::{RootResolver, VcRoot};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayUpdate {
    pub path: PathBuf,
    pub status: VCItemStatus,
}

/// Receives overlay changes for the host's tree view.
pub trait OverlaySink: Send + Sync {
    fn overlays_changed(&self, updates: &[OverlayUpdate]);
}

/// Sink for hosts that only query statuses on demand.
#[derive(Debug, Default)]
pub struct NullOverlaySink;

impl OverlaySink for NullOverlaySink {
    fn overlays_changed(&self, _updates: &[OverlayUpdate]) {}
}

/// Overlay for one path: directories show the worst status beneath them.
pub fn overlay_for(resolver: &mut RootResolver, path: &Path) -> VCItemStatus {
    match resolver.resolve(path, true) {
        Some(result) if path.is_dir() => result.root.aggregate_of(path),
        Some(result) => result.status,
        None => VCItemStatus::Unknown,
    }
}

pub struct OverlayManager {
    sink: Arc<dyn OverlaySink>,
    visible: Vec<PathBuf>,
    rendered: HashMap<PathBuf, VCItemStatus>,
}

impl OverlayManager {
    pub fn new(sink: Arc<dyn OverlaySink>) -> Self {
        Self {
            sink,
            visible: Vec::new(),
            rendered: HashMap::new(),
        }
    }

    pub fn visible(&self) -> &[PathBuf] {
        &self.visible
    }

    /// Last overlay pushed to the sink for `path`.
    pub fn rendered(&self, path: &Path) -> Option<VCItemStatus> {
        self.rendered.get(path).copied()
    }

    /// The host's tree now shows `visible`; render those items.
    pub fn selection_changed(&mut self, resolver: &mut RootResolver, visible: Vec<PathBuf>) {
        self.rendered.retain(|path, _| visible.contains(path));
        self.visible = visible;
        let targets = self.visible.clone();
        self.render(resolver, &targets);
    }

    /// Re-render visible items under roots whose cache changed.
    pub fn roots_updated(&mut self, resolver: &mut RootResolver, roots: &[Arc<VcRoot>]) {
        if roots.is_empty() {
            return;
        }

        let targets: Vec<PathBuf> = self
            .visible
            .iter()
            .filter(|path| {
                roots
                    .iter()
                    .any(|root| path.starts_with(root.path()) || root.path().starts_with(path))
            })
            .cloned()
            .collect();
        self.render(resolver, &targets);
    }

    pub fn refresh_all(&mut self, resolver: &mut RootResolver) {
        let targets = self.visible.clone();
        self.render(resolver, &targets);
    }

    pub fn reset(&mut self) {
        self.visible.clear();
        self.rendered.clear();
    }

    fn render(&mut self, resolver: &mut RootResolver, targets: &[PathBuf]) {
        let mut updates = Vec::new();

        for path in targets {
            let status = overlay_for(resolver, path);
            if self.rendered.insert(path.clone(), status) != Some(status) {
                updates.push(OverlayUpdate {
                    path: path.clone(),
                    status,
                });
            }
        }

        if !updates.is_empty() {
            log::debug!("Pushing {} overlay update(s)", updates.len());
            self.sink.overlays_changed(&updates);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::FakeBackend;
    use crate::backend::{VcBackend, VcKind};
    use parking_lot::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<Vec<OverlayUpdate>>>,
    }

    impl OverlaySink for RecordingSink {
        fn overlays_changed(&self, updates: &[OverlayUpdate]) {
            self.batches.lock().push(updates.to_vec());
        }
    }

    fn setup() -> (TempDir, PathBuf, Arc<FakeBackend>, RootResolver) {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().canonicalize().unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src/Main.as"), "").unwrap();
        std::fs::write(root.join("README.md"), "").unwrap();

        let backend = Arc::new(FakeBackend::new(&root));
        let factory_backend = backend.clone();
        let resolver = RootResolver::new(
            vec![root.clone()],
            Arc::new(move |_: VcKind, _: &Path| factory_backend.clone() as Arc<dyn VcBackend>),
        );
        (temp_dir, root, backend, resolver)
    }

    #[test]
    fn test_directory_shows_aggregate_and_only_changes_are_pushed() {
        let (_temp_dir, root, backend, mut resolver) = setup();
        backend.set_status("src/Main.as", VCItemStatus::Conflicted);
        let sink = Arc::new(RecordingSink::default());
        let mut manager = OverlayManager::new(sink.clone());

        let visible = vec![root.join("src"), root.join("README.md")];
        manager.selection_changed(&mut resolver, visible.clone());
        let roots = resolver.take_discovered();
        roots[0].refresh_now().unwrap();
        manager.roots_updated(&mut resolver, &roots);

        assert_eq!(
            manager.rendered(&root.join("src")),
            Some(VCItemStatus::Conflicted)
        );
        let batches = sink.batches.lock();
        assert_eq!(batches.len(), 2);
        // README.md stayed clean, so only the directory changed on refresh
        assert_eq!(batches[1].len(), 1);
        assert_eq!(batches[1][0].path, root.join("src"));
    }

    #[test]
    fn test_only_visible_items_are_recomputed() {
        let (_temp_dir, root, _backend, mut resolver) = setup();
        let sink = Arc::new(RecordingSink::default());
        let mut manager = OverlayManager::new(sink.clone());

        manager.selection_changed(&mut resolver, vec![root.join("README.md")]);
        assert_eq!(manager.visible().len(), 1);
        assert!(manager.rendered(&root.join("src/Main.as")).is_none());

        manager.selection_changed(&mut resolver, vec![root.join("src/Main.as")]);
        assert!(manager.rendered(&root.join("README.md")).is_none());
    }

    #[test]
    fn test_reset_clears_state() {
        let (_temp_dir, root, _backend, mut resolver) = setup();
        let mut manager = OverlayManager::new(Arc::new(NullOverlaySink));
        manager.selection_changed(&mut resolver, vec![root.join("README.md")]);

        manager.reset();

        assert!(manager.visible().is_empty());
        assert!(manager.rendered(&root.join("README.md")).is_none());
    }
}
