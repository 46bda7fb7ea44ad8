//! Core data types for nupull.
//!
//! This crate defines the vocabulary shared by the registry client, the
//! resolver and the download orchestrator: case-insensitive package ids,
//! NuGet versions and version ranges, package identities, dependency edges,
//! target framework monikers, the resolved package set, and the global
//! configuration file.
//!
//! This crate is intentionally free of async code and network I/O.

/// Package index queried when neither config nor CLI names one.
pub const DEFAULT_SOURCE: &str = "https://api.nuget.org/v3/index.json";

/// Framework used for dependency group selection when none is given.
pub const DEFAULT_FRAMEWORK: &str = "net10.0";

/// Directory (relative to the working directory) artifacts land in by default.
pub const DEFAULT_OUTPUT_DIR: &str = "OfflinePackages";

pub mod config;
pub mod dependency;
pub mod error;
pub mod framework;
pub mod identity;
pub mod resolved;
pub mod version;
