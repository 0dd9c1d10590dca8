//! Live status tracking: root resolution, caching, filesystem watching and overlays.
//!
//! # Threading
//! Backends run their bulk queries on the refresh worker thread and notify delivers
//! events on its own thread. Neither touches the resolver or the overlay state; both
//! hand results over channels that [`WatchContext::pump`] drains on the owner thread.

pub mod cache;
pub mod context;
pub mod debouncer;
pub mod overlay;
pub mod refresh;
pub mod resolver;
pub mod watcher;

pub use cache::{RefreshTicket, StatusCache, StatusSnapshot};
pub use context::WatchContext;
pub use overlay::{overlay_for, NullOverlaySink, OverlayManager, OverlaySink, OverlayUpdate};
pub use resolver::{default_backend_factory, BackendFactory, RootResolver, VcRoot, WatcherVcResult};
pub use watcher::{FileChangeEvent, FileChangeKind, FileWatcher};
