//! Prompter that answers from queues instead of dialogs

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use vcs_overlay::{CommitAnswer, Prompter, RememberAnswer};

/// Answers questions in order; an exhausted queue answers "no".
#[derive(Default)]
pub struct QueuedPrompter {
    pub confirms: Mutex<VecDeque<bool>>,
    pub remembers: Mutex<VecDeque<RememberAnswer>>,
    pub commits: Mutex<VecDeque<CommitAnswer>>,
    pub alerts: Mutex<Vec<String>>,
    pub add_requests: Mutex<Vec<PathBuf>>,
}

impl QueuedPrompter {
    pub fn remembering(accepted: bool, remember: bool) -> Self {
        let prompter = Self::default();
        prompter
            .remembers
            .lock()
            .push_back(RememberAnswer { accepted, remember });
        prompter
    }
}

impl Prompter for QueuedPrompter {
    fn alert(&self, title: &str, message: &str) {
        self.alerts.lock().push(format!("{title}: {message}"));
    }

    fn confirm(&self, _title: &str, _message: &str) -> bool {
        self.confirms.lock().pop_front().unwrap_or(false)
    }

    fn ask_remember(&self, _title: &str, _message: &str) -> RememberAnswer {
        self.remembers
            .lock()
            .pop_front()
            .unwrap_or(RememberAnswer {
                accepted: false,
                remember: false,
            })
    }

    fn ask_commit_message(&self, _title: &str, _message: &str, _default: &str) -> CommitAnswer {
        self.commits
            .lock()
            .pop_front()
            .unwrap_or(CommitAnswer::Cancel)
    }

    fn ask_add_to_version_control(&self, path: &Path) {
        self.add_requests.lock().push(path.to_path_buf());
    }
}
