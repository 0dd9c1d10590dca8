//! Terminal implementations of the host seams: stdin dialogs and printed overlays.

use crate::actions::prompt::{CommitAnswer, Prompter, RememberAnswer};
use crate::core::colors::format_overlay_line;
use crate::core::output::{print_info, print_warning};
use crate::watch::overlay::{OverlaySink, OverlayUpdate};
use colored::*;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Asks on stdout and reads answers from stdin; end of input means "no".
pub struct TerminalPrompter {
    assume_yes: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }

    fn read_answer(&self, question: &str) -> Option<String> {
        print!("{} ", question.white());
        io::stdout().flush().ok()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

impl Prompter for TerminalPrompter {
    fn alert(&self, title: &str, message: &str) {
        print_warning(title, message);
    }

    fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        println!("\n{}\n{message}", title.yellow());
        self.read_answer("[y/N]").is_some_and(|a| is_yes(&a))
    }

    fn ask_remember(&self, title: &str, message: &str) -> RememberAnswer {
        if self.assume_yes {
            return RememberAnswer {
                accepted: true,
                remember: false,
            };
        }
        println!("\n{}\n{message}", title.yellow());
        let answer = self.read_answer("[y/N/always/never]").unwrap_or_default();
        match answer.to_ascii_lowercase().as_str() {
            "always" => RememberAnswer {
                accepted: true,
                remember: true,
            },
            "never" => RememberAnswer {
                accepted: false,
                remember: true,
            },
            other => RememberAnswer {
                accepted: is_yes(other),
                remember: false,
            },
        }
    }

    fn ask_commit_message(
        &self,
        title: &str,
        message: &str,
        default_message: &str,
    ) -> CommitAnswer {
        if self.assume_yes {
            return CommitAnswer::Commit(default_message.to_string());
        }
        println!("\n{}\n{message}", title.yellow());
        println!("{} {default_message}", "Default:".bright_black());

        let Some(answer) = self.read_answer("Message (enter for default, n to skip, never):")
        else {
            return CommitAnswer::Cancel;
        };
        match answer.as_str() {
            "" => CommitAnswer::Commit(default_message.to_string()),
            "n" | "N" => CommitAnswer::Cancel,
            "never" => CommitAnswer::Never,
            custom => CommitAnswer::Commit(custom.to_string()),
        }
    }

    fn ask_add_to_version_control(&self, path: &Path) {
        print_info(&format!(
            "{} is not under version control yet.",
            path.display()
        ));
    }
}

/// Prints overlay changes relative to a base directory.
pub struct PrintingSink {
    base: PathBuf,
}

impl PrintingSink {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }
}

impl OverlaySink for PrintingSink {
    fn overlays_changed(&self, updates: &[OverlayUpdate]) {
        for update in updates {
            let shown = update.path.strip_prefix(&self.base).unwrap_or(&update.path);
            let shown = if shown.as_os_str().is_empty() {
                ".".to_string()
            } else {
                shown.display().to_string()
            };
            println!("{}", format_overlay_line(update.status, &shown));
        }
    }
}
