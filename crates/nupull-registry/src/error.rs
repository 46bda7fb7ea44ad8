use miette::Diagnostic;
use nupull_core::error::CoreError;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum RegistryError {
    #[error("Package {package} not found")]
    #[diagnostic(help("Check the package id and version, or pass --source for a different feed"))]
    NotFound { package: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Unexpected response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Core(#[from] CoreError),

    #[error("Operation cancelled")]
    Cancelled,
}

impl RegistryError {
    pub fn not_found(package: impl std::fmt::Display) -> Self {
        RegistryError::NotFound {
            package: package.to_string(),
        }
    }

    /// Whether the registry reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}
