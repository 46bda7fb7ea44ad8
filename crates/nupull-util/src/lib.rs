//! Shared utilities for nupull.
//!
//! This crate provides cross-cutting concerns used by all other nupull crates:
//! the unified error type, filesystem helpers, artifact hashing, and terminal
//! status/progress output.

pub mod errors;
pub mod fs;
pub mod hash;
pub mod progress;
