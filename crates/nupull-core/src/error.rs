use miette::Diagnostic;
use thiserror::Error;

/// Parse failures for user- or registry-supplied package data.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CoreError {
    #[error("Invalid version '{input}': {reason}")]
    #[diagnostic(help("Versions look like 1.2.3, 1.2.3.4 or 1.2.3-beta.1"))]
    InvalidVersion { input: String, reason: String },

    #[error("Invalid version range '{input}': {reason}")]
    InvalidRange { input: String, reason: String },

    #[error("Invalid package id '{input}': {reason}")]
    #[diagnostic(help("Package ids contain letters, digits, '.', '_' and '-'"))]
    InvalidPackageId { input: String, reason: String },
}

impl CoreError {
    pub(crate) fn version(input: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidVersion {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn range(input: &str, reason: impl Into<String>) -> Self {
        CoreError::InvalidRange {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
