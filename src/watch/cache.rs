//! Per-root status cache with generation-tagged refreshes.
//!
//! Readers take an `Arc` of the current [`StatusSnapshot`], so they always see one whole
//! map, either from before or after a refresh. Every invalidation bumps the generation;
//! a refresh result is applied only when the generation it started under is still
//! current, which drops results that a forced refresh or a newer file change superseded.

use crate::backend::StatusMap;
use crate::core::vc_status::VCItemStatus;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Immutable view of a root's status at one point in time.
#[derive(Debug, Clone, Default)]
pub struct StatusSnapshot {
    generation: u64,
    loaded: bool,
    entries: StatusMap,
}

impl StatusSnapshot {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// False until the first bulk query has been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn entries(&self) -> &StatusMap {
        &self.entries
    }

    /// Status of a root-relative path.
    ///
    /// Exact entry first, then an untracked or ignored ancestor (collapsed directory),
    /// otherwise the path is tracked and clean.
    pub fn status_of(&self, rel: &Path) -> VCItemStatus {
        if let Some(status) = self.entries.get(rel) {
            return *status;
        }

        rel.ancestors()
            .skip(1)
            .filter(|a| !a.as_os_str().is_empty())
            .filter_map(|a| self.entries.get(a))
            .find(|s| s.is_untracked())
            .copied()
            .unwrap_or(VCItemStatus::UpToDate)
    }

    /// Worst status among `rel` and everything cached beneath it.
    pub fn aggregate(&self, rel: &Path) -> VCItemStatus {
        let own = self.status_of(rel);
        if own.is_untracked() {
            return own;
        }

        self.entries
            .range(rel.to_path_buf()..)
            .take_while(|(path, _)| path.starts_with(rel))
            .map(|(_, status)| *status)
            .fold(own, VCItemStatus::max)
    }
}

/// Handed out when a refresh starts; presented again when its result arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct StatusCache {
    snapshot: RwLock<Arc<StatusSnapshot>>,
    generation: AtomicU64,
    dirty: AtomicBool,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.snapshot.read().clone()
    }

    pub fn get_overlay(&self, rel: &Path) -> VCItemStatus {
        self.snapshot().status_of(rel)
    }

    pub fn aggregate(&self, rel: &Path) -> VCItemStatus {
        self.snapshot().aggregate(rel)
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot.read().is_loaded()
    }

    /// Something changed since the last applied refresh.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn is_current(&self, ticket: &RefreshTicket) -> bool {
        ticket.generation == self.generation()
    }

    pub fn begin_refresh(&self) -> RefreshTicket {
        self.dirty.store(false, Ordering::Release);
        RefreshTicket {
            generation: self.generation(),
        }
    }

    /// Apply a bulk result; returns false when the ticket was superseded.
    pub fn complete_refresh(&self, ticket: RefreshTicket, entries: StatusMap) -> bool {
        let mut guard = self.snapshot.write();
        if ticket.generation != self.generation() {
            log::debug!(
                "Discarding refresh from generation {} (current {})",
                ticket.generation,
                self.generation()
            );
            return false;
        }

        *guard = Arc::new(StatusSnapshot {
            generation: ticket.generation,
            loaded: true,
            entries,
        });
        true
    }

    /// A filesystem change touched `rel`; in-flight refreshes are now stale.
    pub fn invalidate(&self, rel: &Path) {
        let _guard = self.snapshot.write();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        self.dirty.store(true, Ordering::Release);
        log::debug!("Invalidated {} (generation {generation})", rel.display());
    }

    /// Drop everything known about this root and require a full bulk query.
    pub fn invalidate_all(&self) {
        let _guard = self.snapshot.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.dirty.store(true, Ordering::Release);
    }

    /// Record a freshly probed single-path status.
    ///
    /// A value that disagrees with the snapshot proves it stale, so the root is
    /// invalidated as well.
    pub fn update_entry(&self, rel: &Path, status: VCItemStatus) {
        let mut guard = self.snapshot.write();
        if !guard.is_loaded() || guard.status_of(rel) == status {
            return;
        }

        let snapshot = Arc::make_mut(&mut guard);
        if status == VCItemStatus::UpToDate {
            snapshot.entries.remove(rel);
        } else {
            snapshot.entries.insert(rel.to_path_buf(), status);
        }
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.dirty.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn map(entries: &[(&str, VCItemStatus)]) -> StatusMap {
        entries
            .iter()
            .map(|(p, s)| (PathBuf::from(p), *s))
            .collect()
    }

    fn loaded_cache(entries: &[(&str, VCItemStatus)]) -> StatusCache {
        let cache = StatusCache::new();
        let ticket = cache.begin_refresh();
        assert!(cache.complete_refresh(ticket, map(entries)));
        cache
    }

    #[test]
    fn test_lookup_exact_inherited_and_default() {
        let cache = loaded_cache(&[
            ("src/Main.as", VCItemStatus::Modified),
            ("scratch", VCItemStatus::Unknown),
            ("bin", VCItemStatus::Ignored),
        ]);

        assert_eq!(
            cache.get_overlay(Path::new("src/Main.as")),
            VCItemStatus::Modified
        );
        assert_eq!(
            cache.get_overlay(Path::new("scratch/deep/a.txt")),
            VCItemStatus::Unknown
        );
        assert_eq!(
            cache.get_overlay(Path::new("bin/app.swf")),
            VCItemStatus::Ignored
        );
        assert_eq!(
            cache.get_overlay(Path::new("src/Other.as")),
            VCItemStatus::UpToDate
        );
    }

    #[test]
    fn test_aggregate_takes_worst_descendant() {
        let cache = loaded_cache(&[
            ("src/a/One.as", VCItemStatus::Modified),
            ("src/b/Two.as", VCItemStatus::Conflicted),
            ("src/b/notes.txt", VCItemStatus::Unknown),
            ("srcx/Three.as", VCItemStatus::Deleted),
        ]);

        assert_eq!(cache.aggregate(Path::new("src")), VCItemStatus::Conflicted);
        assert_eq!(cache.aggregate(Path::new("src/a")), VCItemStatus::Modified);
        assert_eq!(cache.aggregate(Path::new("lib")), VCItemStatus::UpToDate);
        // Root aggregate covers everything, including sibling prefixes like "srcx"
        assert_eq!(cache.aggregate(Path::new("")), VCItemStatus::Conflicted);
    }

    #[test]
    fn test_stale_refresh_is_discarded_after_force_refresh() {
        let cache = loaded_cache(&[("a.txt", VCItemStatus::Modified)]);

        let stale = cache.begin_refresh();
        cache.invalidate_all();
        let fresh = cache.begin_refresh();

        assert!(cache.complete_refresh(fresh, map(&[("a.txt", VCItemStatus::Added)])));
        assert!(!cache.complete_refresh(stale, map(&[("a.txt", VCItemStatus::Conflicted)])));
        assert_eq!(cache.get_overlay(Path::new("a.txt")), VCItemStatus::Added);
    }

    #[test]
    fn test_stale_refresh_arriving_first_is_also_discarded() {
        let cache = StatusCache::new();
        let stale = cache.begin_refresh();
        cache.invalidate(Path::new("a.txt"));

        assert!(!cache.complete_refresh(stale, map(&[("a.txt", VCItemStatus::Modified)])));
        assert!(!cache.is_loaded());
        assert!(cache.is_dirty());
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let cache = loaded_cache(&[("a.txt", VCItemStatus::Modified)]);
        let before = cache.snapshot();

        let ticket = cache.begin_refresh();
        cache.complete_refresh(ticket, StatusMap::new());

        assert_eq!(before.status_of(Path::new("a.txt")), VCItemStatus::Modified);
        assert_eq!(cache.get_overlay(Path::new("a.txt")), VCItemStatus::UpToDate);
    }

    #[test]
    fn test_update_entry_marks_stale() {
        let cache = loaded_cache(&[("a.txt", VCItemStatus::Modified)]);
        let generation = cache.generation();

        cache.update_entry(Path::new("a.txt"), VCItemStatus::Modified);
        assert_eq!(cache.generation(), generation);

        cache.update_entry(Path::new("a.txt"), VCItemStatus::UpToDate);
        assert_eq!(cache.get_overlay(Path::new("a.txt")), VCItemStatus::UpToDate);
        assert!(cache.generation() > generation);
        assert!(cache.is_dirty());
    }
}
