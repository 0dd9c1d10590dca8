//! Consolidated test utilities for vcs-overlay
//!
//! This module provides unified testing utilities for integration tests,
//! focused on real git working copies for reliable testing.

pub mod assertions;
pub mod fixtures;
pub mod prompter;
pub mod repository;
