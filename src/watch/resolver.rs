//! Maps paths to the working-copy root that owns them.
//!
//! Resolution walks upward from a path until a directory holding version-control
//! metadata is found; the nearest root wins. Answers are memoized per directory, and
//! each discovered root gets its backend and status cache exactly once.

use crate::backend::{relative_to, VcBackend, VcKind};
use crate::core::error::Result;
use crate::core::vc_status::VCItemStatus;
use crate::watch::cache::StatusCache;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builds the backend for a freshly discovered root.
pub type BackendFactory = Arc<dyn Fn(VcKind, &Path) -> Arc<dyn VcBackend> + Send + Sync>;

pub fn default_backend_factory() -> BackendFactory {
    Arc::new(|kind: VcKind, root: &Path| kind.create_backend(root))
}

/// A discovered working-copy root with its backend and cache.
pub struct VcRoot {
    path: PathBuf,
    kind: VcKind,
    backend: Arc<dyn VcBackend>,
    cache: StatusCache,
}

impl fmt::Debug for VcRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VcRoot")
            .field("path", &self.path)
            .field("kind", &self.kind)
            .finish()
    }
}

impl VcRoot {
    pub fn new(path: PathBuf, kind: VcKind, backend: Arc<dyn VcBackend>) -> Self {
        Self {
            path,
            kind,
            backend,
            cache: StatusCache::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> VcKind {
        self.kind
    }

    pub fn backend(&self) -> &Arc<dyn VcBackend> {
        &self.backend
    }

    pub fn cache(&self) -> &StatusCache {
        &self.cache
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(self.kind.metadata_dir())
    }

    /// Whether `path` lives inside this root's metadata directory.
    pub fn is_metadata_path(&self, path: &Path) -> bool {
        path.starts_with(self.metadata_path())
    }

    pub fn relative(&self, path: &Path) -> Option<PathBuf> {
        relative_to(&self.path, path).ok()
    }

    /// Cached status of an absolute path below this root.
    pub fn status_of(&self, path: &Path) -> VCItemStatus {
        self.relative(path)
            .map(|rel| self.cache.get_overlay(&rel))
            .unwrap_or(VCItemStatus::Unknown)
    }

    /// Cached aggregate of a directory below this root.
    pub fn aggregate_of(&self, path: &Path) -> VCItemStatus {
        self.relative(path)
            .map(|rel| self.cache.aggregate(&rel))
            .unwrap_or(VCItemStatus::Unknown)
    }

    /// Run a bulk query on the calling thread and apply it.
    pub fn refresh_now(&self) -> Result<bool> {
        let ticket = self.cache.begin_refresh();
        let entries = self.backend.bulk_status()?;
        Ok(self.cache.complete_refresh(ticket, entries))
    }
}

/// Outcome of resolving one path.
#[derive(Debug, Clone)]
pub struct WatcherVcResult {
    pub path: PathBuf,
    pub root: Arc<VcRoot>,
    pub status: VCItemStatus,
}

impl WatcherVcResult {
    pub fn backend(&self) -> &dyn VcBackend {
        self.root.backend().as_ref()
    }
}

pub struct RootResolver {
    scopes: Vec<PathBuf>,
    /// Directory -> nearest root, or `None` when the walk found nothing.
    memo: HashMap<PathBuf, Option<PathBuf>>,
    roots: HashMap<PathBuf, Arc<VcRoot>>,
    discovered: Vec<Arc<VcRoot>>,
    factory: BackendFactory,
}

impl RootResolver {
    pub fn new(scopes: Vec<PathBuf>, factory: BackendFactory) -> Self {
        Self {
            scopes,
            memo: HashMap::new(),
            roots: HashMap::new(),
            discovered: Vec::new(),
            factory,
        }
    }

    pub fn scopes(&self) -> &[PathBuf] {
        &self.scopes
    }

    pub fn covers(&self, path: &Path) -> bool {
        self.scopes.iter().any(|scope| path.starts_with(scope))
    }

    pub fn roots(&self) -> impl Iterator<Item = &Arc<VcRoot>> {
        self.roots.values()
    }

    /// Roots found since the last call, for the owner to watch and refresh.
    pub fn take_discovered(&mut self) -> Vec<Arc<VcRoot>> {
        std::mem::take(&mut self.discovered)
    }

    /// Resolve `path` to its root and status.
    ///
    /// With `use_cache` the memo and the status cache answer; without it the root is
    /// re-detected on disk and the backend probes the path directly, loading the root's
    /// cache synchronously if nothing has been loaded yet.
    pub fn resolve(&mut self, path: &Path, use_cache: bool) -> Option<WatcherVcResult> {
        if !self.covers(path) {
            log::trace!("{} is outside the project scope", path.display());
            return None;
        }

        let dir = if path.is_dir() {
            path
        } else {
            path.parent()?
        };
        let root_path = self.find_root(dir, use_cache)?;
        let root = self.root_at(&root_path)?;

        let status = if use_cache {
            root.status_of(path)
        } else {
            self.probe(&root, path)
        };

        Some(WatcherVcResult {
            path: path.to_path_buf(),
            root,
            status,
        })
    }

    fn probe(&self, root: &VcRoot, path: &Path) -> VCItemStatus {
        if !root.cache().is_loaded() {
            log::debug!("Loading status of {} synchronously", root.path().display());
            if let Err(e) = root.refresh_now() {
                log::warn!("Status query for {} failed: {e}", root.path().display());
            }
        }

        match root.backend().path_status(path) {
            Ok(status) => {
                if let Some(rel) = root.relative(path) {
                    root.cache().update_entry(&rel, status);
                }
                status
            }
            Err(e) => {
                log::warn!("Status of {} failed: {e}", path.display());
                root.status_of(path)
            }
        }
    }

    fn find_root(&mut self, dir: &Path, use_cache: bool) -> Option<PathBuf> {
        if use_cache {
            if let Some(known) = self.memo.get(dir) {
                return known.clone();
            }
        }

        let mut found = None;
        for ancestor in dir.ancestors() {
            if use_cache {
                if let Some(known) = self.memo.get(ancestor) {
                    found = known.clone();
                    break;
                }
            }
            if VcKind::detect(ancestor).is_some() {
                found = Some(ancestor.to_path_buf());
                break;
            }
        }

        self.memo.insert(dir.to_path_buf(), found.clone());
        found
    }

    fn root_at(&mut self, root_path: &Path) -> Option<Arc<VcRoot>> {
        if let Some(root) = self.roots.get(root_path) {
            return Some(root.clone());
        }

        let kind = VcKind::detect(root_path)?;
        let backend = (self.factory)(kind, root_path);
        let root = Arc::new(VcRoot::new(root_path.to_path_buf(), kind, backend));
        log::info!("Found {kind} root at {}", root_path.display());

        self.roots.insert(root_path.to_path_buf(), root.clone());
        self.discovered.push(root.clone());
        Some(root)
    }

    /// Nearest already-known root above `path`, without touching the disk.
    pub fn known_root_for(&self, path: &Path) -> Option<Arc<VcRoot>> {
        path.ancestors()
            .find_map(|ancestor| self.roots.get(ancestor))
            .cloned()
    }

    /// Drop memoized answers at or below `path`; returns roots that no longer exist.
    pub fn forget(&mut self, path: &Path) -> Vec<Arc<VcRoot>> {
        self.memo.retain(|dir, _| !dir.starts_with(path));

        let gone: Vec<PathBuf> = self
            .roots
            .keys()
            .filter(|root| root.starts_with(path) && VcKind::detect(root).is_none())
            .cloned()
            .collect();

        gone.iter()
            .filter_map(|root| {
                log::info!("Root {} disappeared", root.display());
                self.memo.retain(|_, known| known.as_deref() != Some(root.as_path()));
                self.roots.remove(root)
            })
            .collect()
    }

    /// Forget every root and memoized answer.
    pub fn clear(&mut self) {
        self.memo.clear();
        self.roots.clear();
        self.discovered.clear();
    }
}
