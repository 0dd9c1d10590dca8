//! User interaction seam between the dispatcher and the host's dialogs.

use std::path::Path;

/// Title used for every confirmation dialog.
pub const CONFIRM_TITLE: &str = "Confirm";

/// Longest list shown in full by [`preview_list`].
const PREVIEW_LIMIT: usize = 9;

/// Answer to a yes/no question carrying a "remember my choice" toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RememberAnswer {
    pub accepted: bool,
    pub remember: bool,
}

/// Answer to the post-move commit prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitAnswer {
    /// Commit with the (possibly edited) message.
    Commit(String),
    Cancel,
    /// Cancel and stop asking after moves.
    Never,
}

/// Dialogs the dispatcher needs from the host.
///
/// Every method except [`Prompter::ask_add_to_version_control`] blocks until the user
/// answered. That one only shows a non-modal question; the host reports the answer later
/// through `ActionDispatcher::resolve_add_prompt`.
pub trait Prompter: Send + Sync {
    /// Blocking error notice.
    fn alert(&self, title: &str, message: &str);

    /// OK/Cancel question; true on OK.
    fn confirm(&self, title: &str, message: &str) -> bool;

    fn ask_remember(&self, title: &str, message: &str) -> RememberAnswer;

    /// Line entry prefilled with `default_message`.
    fn ask_commit_message(&self, title: &str, message: &str, default_message: &str)
        -> CommitAnswer;

    fn ask_add_to_version_control(&self, path: &Path);
}

/// Bounded listing for dialogs: up to nine names, otherwise the first nine, an
/// ellipsis line and the last name.
pub fn preview_list<S: AsRef<str>>(items: &[S]) -> String {
    let lines: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    if lines.len() <= PREVIEW_LIMIT {
        return lines.join("\n");
    }

    let mut shown = lines[..PREVIEW_LIMIT].to_vec();
    shown.push("(...)");
    shown.extend(lines.last());
    shown.join("\n")
}
