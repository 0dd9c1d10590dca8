//! The slice of the host's project model the overlay engine needs.

use std::path::{Path, PathBuf};

/// A project identified by its root directory.
///
/// Owned by the host editor; the engine only reads it when attaching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub root: PathBuf,
    /// Build output location, resolved for the build/test hooks.
    pub output_path: Option<PathBuf>,
    /// Additional source directories outside `root` that are watched too.
    pub extra_paths: Vec<PathBuf>,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_path: None,
            extra_paths: Vec::new(),
        }
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    pub fn with_extra_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_paths.push(path.into());
        self
    }

    /// Absolute output path, falling back to the project root.
    pub fn output_path_absolute(&self) -> PathBuf {
        match &self.output_path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.root.join(path),
            None => self.root.clone(),
        }
    }

    /// Every directory the watcher should cover for this project.
    pub fn scope_paths(&self) -> Vec<PathBuf> {
        let mut paths = vec![self.root.clone()];
        for extra in &self.extra_paths {
            if !paths.iter().any(|p| extra.starts_with(p)) {
                paths.push(extra.clone());
            }
        }
        paths
    }

    /// Whether `path` lies inside any scope directory.
    pub fn covers(&self, path: &Path) -> bool {
        self.scope_paths().iter().any(|scope| path.starts_with(scope))
    }

    /// `path` relative to the project root, or unchanged when outside it.
    pub fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
