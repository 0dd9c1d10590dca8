//! Common assertion helpers for test output validation

#![allow(dead_code)]

use predicates::prelude::*;

/// Creates a predicate that checks for the "not under version control" error
pub fn not_under_version_control() -> impl Predicate<str> {
    predicates::str::contains("Not under version control")
}

/// Creates a predicate that checks for an overlay status description
pub fn has_status(status: &str) -> impl Predicate<str> {
    predicates::str::contains(format!("({})", status))
}

/// Creates a predicate that checks for the clean working copy message
pub fn is_clean() -> impl Predicate<str> {
    predicates::str::contains("Nothing to report")
}
