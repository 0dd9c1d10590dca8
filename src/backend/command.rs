//! Synchronous invocation of an external version-control tool.

use crate::core::error::{Result, VcsOverlayError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// One tool invocation: program, working directory and arguments.
///
/// The caller blocks until the tool exits; timeouts are left to the tool itself.
#[derive(Debug)]
pub struct VcsCommand {
    program: &'static str,
    workdir: PathBuf,
    args: Vec<std::ffi::OsString>,
}

impl VcsCommand {
    pub fn new(program: &'static str, workdir: &Path) -> Self {
        Self {
            program,
            workdir: workdir.to_path_buf(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Command line for logs and error messages
    pub fn display(&self) -> String {
        let mut line = self.program.to_string();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Run to completion and return stdout; a non-zero exit is an error carrying stderr.
    pub fn run(&self) -> Result<String> {
        log::debug!("Running `{}` in {}", self.display(), self.workdir.display());

        let output = Command::new(self.program)
            .args(&self.args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| VcsOverlayError::command_spawn_failed(self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VcsOverlayError::command_failed(
                self.display(),
                stderr.trim(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_joins_arguments() {
        let cmd = VcsCommand::new("git", Path::new("/repo"))
            .arg("mv")
            .args(["a.txt", "b.txt"]);
        assert_eq!(cmd.display(), "git mv a.txt b.txt");
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let cmd = VcsCommand::new("vcs-overlay-no-such-tool", Path::new("."));
        let err = cmd.run().unwrap_err();
        assert!(matches!(err, VcsOverlayError::CommandSpawnFailed { .. }));
    }
}
