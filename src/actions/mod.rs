//! Editor file actions routed through version control.
//!
//! # Public API
//! - [`ActionDispatcher`]: Owns the watch context and answers every host callback
//! - [`Prompter`]: Dialogs the host provides for confirmations and commit messages
//! - [`classify`]: Safety classification of a delete batch

pub mod delete;
pub mod dispatcher;
pub mod prompt;

pub use delete::{classify, collect_files, DeletePlan, UnsafeDelete};
pub use dispatcher::ActionDispatcher;
pub use prompt::{preview_list, CommitAnswer, Prompter, RememberAnswer};
