use miette::Diagnostic;
use nupull_core::error::CoreError;
use nupull_registry::RegistryError;
use thiserror::Error;

/// Failures that stop a resolution run. Anything below the root is
/// recorded in the result instead.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    InvalidVersion(#[from] CoreError),

    #[error("Package {package} not found")]
    #[diagnostic(help("Check the spelling, or list published versions with `nupull versions`"))]
    RootNotFound { package: String },

    #[error("Failed to resolve {package}")]
    Root {
        package: String,
        #[source]
        #[diagnostic_source]
        source: RegistryError,
    },

    #[error("Resolution cancelled")]
    Cancelled,
}

impl ResolveError {
    /// Classify a failure turning the requested id and version into the root
    /// identity. Only a malformed version string is `InvalidVersion`.
    pub(crate) fn from_root(package: impl std::fmt::Display, err: RegistryError) -> Self {
        match err {
            RegistryError::Core(e @ CoreError::InvalidVersion { .. }) => {
                ResolveError::InvalidVersion(e)
            }
            other => Self::from_root_dependencies(package, other),
        }
    }

    /// Classify a failure reading the root package's dependencies.
    pub(crate) fn from_root_dependencies(
        package: impl std::fmt::Display,
        err: RegistryError,
    ) -> Self {
        match err {
            RegistryError::NotFound { .. } => ResolveError::RootNotFound {
                package: package.to_string(),
            },
            RegistryError::Cancelled => ResolveError::Cancelled,
            source => ResolveError::Root {
                package: package.to_string(),
                source,
            },
        }
    }
}
