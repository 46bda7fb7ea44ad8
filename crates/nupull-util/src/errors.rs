use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for nupull operations above the registry layer.
#[derive(Debug, Error, Diagnostic)]
pub enum NupullError {
    /// Invalid or unreadable configuration (e.g. `~/.nupull/config.toml`).
    #[error("Config error: {message}")]
    #[diagnostic(help("Check ~/.nupull/config.toml for syntax errors"))]
    Config { message: String },

    /// One or more artifacts could not be downloaded, or the output directory is unusable.
    #[error("Download failed: {message}")]
    #[diagnostic(help("Re-run the same command; already downloaded packages are skipped"))]
    Download { message: String },

    /// The run was interrupted by the user.
    #[error("Operation cancelled")]
    Cancelled,

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type NupullResult<T> = miette::Result<T>;
