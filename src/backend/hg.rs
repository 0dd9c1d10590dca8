//! Mercurial backend driven through the `hg` command line client.

use crate::backend::{
    relative_to, remove_leftovers, FileActions, StatusMap, VcBackend, VcKind, VcsCommand,
};
use crate::core::error::{Result, VcsOverlayError};
use crate::core::vc_status::VCItemStatus;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct MercurialBackend {
    root: PathBuf,
}

impl MercurialBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn hg(&self) -> VcsCommand {
        VcsCommand::new("hg", &self.root).args(["--noninteractive", "--color", "never"])
    }

    fn relative_paths(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        paths.iter().map(|p| relative_to(&self.root, p)).collect()
    }
}

fn status_from_code(code: char) -> Option<VCItemStatus> {
    match code {
        'M' => Some(VCItemStatus::Modified),
        'A' => Some(VCItemStatus::Added),
        'R' | '!' => Some(VCItemStatus::Deleted),
        '?' => Some(VCItemStatus::Unknown),
        'I' => Some(VCItemStatus::Ignored),
        'C' => Some(VCItemStatus::UpToDate),
        'U' => Some(VCItemStatus::Conflicted),
        _ => None,
    }
}

/// Parse `hg status` / `hg resolve --list` lines: one code letter, a space, the path.
pub fn parse_status(output: &str) -> Result<Vec<(PathBuf, VCItemStatus)>> {
    let mut entries = Vec::new();

    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        let mut chars = line.chars();
        let status = chars
            .next()
            .and_then(status_from_code)
            .filter(|_| chars.next() == Some(' '))
            .ok_or_else(|| VcsOverlayError::unparsable_status("hg", line))?;
        entries.push((PathBuf::from(&line[2..]), status));
    }

    Ok(entries)
}

impl FileActions for MercurialBackend {
    fn file_new(&self, path: &Path) -> Result<bool> {
        let rel = relative_to(&self.root, path)?;
        self.hg().arg("add").arg("--").arg(rel).run()?;
        Ok(true)
    }

    fn file_rename(&self, from: &Path, to: &Path) -> Result<bool> {
        self.file_move(from, to)
    }

    fn file_move(&self, from: &Path, to: &Path) -> Result<bool> {
        let from_rel = relative_to(&self.root, from)?;
        let to_rel = relative_to(&self.root, to)?;
        self.hg()
            .arg("rename")
            .arg("--")
            .arg(from_rel)
            .arg(to_rel)
            .run()?;
        Ok(true)
    }

    fn file_delete(&self, paths: &[PathBuf], _confirm: bool) -> Result<bool> {
        if paths.is_empty() {
            return Ok(false);
        }

        let rels = self.relative_paths(paths)?;
        self.hg().args(["remove", "-f", "--"]).args(&rels).run()?;
        remove_leftovers(paths)?;
        Ok(true)
    }
}

impl VcBackend for MercurialBackend {
    fn kind(&self) -> VcKind {
        VcKind::Mercurial
    }

    fn root(&self) -> &Path {
        &self.root
    }

    fn bulk_status(&self) -> Result<StatusMap> {
        let output = self.hg().args(["status", "-mardui"]).run()?;
        let mut map: StatusMap = parse_status(&output)?.into_iter().collect();

        // Unresolved merges only show up in resolve --list
        match self.hg().args(["resolve", "--list"]).run() {
            Ok(resolve) => {
                for (path, status) in parse_status(&resolve)? {
                    if status == VCItemStatus::Conflicted {
                        map.insert(path, status);
                    }
                }
            }
            Err(e) => log::debug!("hg resolve --list failed: {e}"),
        }

        Ok(map)
    }

    fn path_status(&self, path: &Path) -> Result<VCItemStatus> {
        let rel = relative_to(&self.root, path)?;
        if rel.as_os_str().is_empty() {
            return Ok(VCItemStatus::UpToDate);
        }

        let output = self.hg().args(["status", "-A", "--"]).arg(&rel).run()?;
        let entries = parse_status(&output)?;

        if path.is_dir() {
            // A directory is tracked when anything beneath it is
            let status = if entries.iter().any(|(_, s)| s.is_tracked()) {
                VCItemStatus::UpToDate
            } else if !entries.is_empty() && entries.iter().all(|(_, s)| *s == VCItemStatus::Ignored) {
                VCItemStatus::Ignored
            } else {
                VCItemStatus::Unknown
            };
            return Ok(status);
        }

        Ok(entries
            .into_iter()
            .find(|(p, _)| *p == rel)
            .map(|(_, s)| s)
            .unwrap_or(VCItemStatus::Unknown))
    }

    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }

        let rels = self.relative_paths(paths)?;
        self.hg()
            .args(["commit", "-m", message, "--"])
            .args(&rels)
            .run()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_codes() {
        let output = "M src/Main.as\nA src/New.as\nR old.as\n! missing.as\n? notes.txt\nI bin/app.swf\n";
        let entries = parse_status(output).unwrap();

        assert_eq!(
            entries,
            vec![
                (PathBuf::from("src/Main.as"), VCItemStatus::Modified),
                (PathBuf::from("src/New.as"), VCItemStatus::Added),
                (PathBuf::from("old.as"), VCItemStatus::Deleted),
                (PathBuf::from("missing.as"), VCItemStatus::Deleted),
                (PathBuf::from("notes.txt"), VCItemStatus::Unknown),
                (PathBuf::from("bin/app.swf"), VCItemStatus::Ignored),
            ]
        );
    }

    #[test]
    fn test_parse_resolve_list() {
        let entries = parse_status("U src/Main.as\nR src/Done.as\n").unwrap();
        assert_eq!(entries[0].1, VCItemStatus::Conflicted);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = parse_status("abort: no repository found").unwrap_err();
        assert!(matches!(err, VcsOverlayError::UnparsableStatus { .. }));
    }
}
