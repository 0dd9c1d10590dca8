//! In-memory backend for unit tests of the resolver, cache and dispatcher.

use crate::backend::{relative_to, FileActions, StatusMap, VcBackend, VcKind};
use crate::core::error::{Result, VcsOverlayError};
use crate::core::vc_status::VCItemStatus;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    New(PathBuf),
    Open(PathBuf),
    Rename(PathBuf, PathBuf),
    Move(PathBuf, PathBuf),
    Delete(Vec<PathBuf>, bool),
    Commit(Vec<PathBuf>, String),
    Build,
    Save,
}

#[derive(Debug)]
pub struct FakeBackend {
    root: PathBuf,
    pub statuses: Mutex<StatusMap>,
    pub calls: Mutex<Vec<Call>>,
    pub fail_commands: Mutex<bool>,
}

impl FakeBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            statuses: Mutex::new(StatusMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_commands: Mutex::new(false),
        }
    }

    pub fn set_status(&self, rel: &str, status: VCItemStatus) {
        self.statuses.lock().insert(PathBuf::from(rel), status);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) -> Result<bool> {
        self.calls.lock().push(call);
        if *self.fail_commands.lock() {
            return Err(VcsOverlayError::command_failed("fake", "forced failure"));
        }
        Ok(true)
    }
}

impl FileActions for FakeBackend {
    fn file_new(&self, path: &Path) -> Result<bool> {
        self.record(Call::New(path.to_path_buf()))
    }

    fn file_open(&self, path: &Path) -> Result<bool> {
        self.calls.lock().push(Call::Open(path.to_path_buf()));
        Ok(false)
    }

    fn file_rename(&self, from: &Path, to: &Path) -> Result<bool> {
        self.record(Call::Rename(from.to_path_buf(), to.to_path_buf()))
    }

    fn file_move(&self, from: &Path, to: &Path) -> Result<bool> {
        self.record(Call::Move(from.to_path_buf(), to.to_path_buf()))
    }

    fn file_delete(&self, paths: &[PathBuf], confirm: bool) -> Result<bool> {
        self.record(Call::Delete(paths.to_vec(), confirm))
    }

    fn build_project(&self) -> Result<bool> {
        self.record(Call::Build)
    }

    fn save_project(&self) -> Result<bool> {
        self.record(Call::Save)
    }
}

impl VcBackend for FakeBackend {
    fn kind(&self) -> VcKind {
        VcKind::Git
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn bulk_status(&self) -> Result<StatusMap> {
        Ok(self.statuses.lock().clone())
    }

    fn path_status(&self, path: &Path) -> Result<VCItemStatus> {
        let rel = relative_to(&self.root, path)?;
        let statuses = self.statuses.lock();
        if let Some(status) = statuses.get(&rel) {
            return Ok(*status);
        }
        let inherited = rel
            .ancestors()
            .skip(1)
            .filter_map(|a| statuses.get(a))
            .find(|s| s.is_untracked());
        Ok(inherited.copied().unwrap_or(VCItemStatus::UpToDate))
    }

    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        self.record(Call::Commit(paths.to_vec(), message.to_string()))
            .map(|_| ())
    }
}
