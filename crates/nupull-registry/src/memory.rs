//! A programmable in-memory registry.
//!
//! Used by the resolver and download tests in place of a live feed. Each
//! package can be switched to have no dependency information, to fail or
//! hang its dependency fetch, or to fail or hang its artifact download.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use nupull_core::dependency::DependencyEdge;
use nupull_core::error::CoreError;
use nupull_core::framework::TargetFramework;
use nupull_core::identity::{PackageId, PackageIdentity};
use nupull_core::version::NuGetVersion;
use tokio::io::AsyncWriteExt;

use crate::error::RegistryError;
use crate::registry::PackageRegistry;

#[derive(Default)]
pub struct InMemoryRegistry {
    packages: HashMap<PackageId, Vec<NuGetVersion>>,
    dependencies: HashMap<PackageIdentity, Vec<DependencyEdge>>,
    absent: HashSet<PackageIdentity>,
    failing_dependencies: HashSet<PackageIdentity>,
    failing_artifacts: HashSet<PackageIdentity>,
    malformed_dependencies: HashSet<PackageIdentity>,
    stalled_dependencies: HashSet<PackageIdentity>,
    stalled_artifacts: HashSet<PackageIdentity>,
    dependency_fetches: Mutex<HashMap<PackageIdentity, usize>>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `identity` with the given dependencies (for every framework).
    pub fn add_package(&mut self, identity: PackageIdentity, dependencies: Vec<DependencyEdge>) {
        let versions = self.packages.entry(identity.id.clone()).or_default();
        if !versions.contains(&identity.version) {
            versions.push(identity.version.clone());
        }
        self.dependencies.insert(identity, dependencies);
    }

    /// The registry has no dependency information for `identity`.
    pub fn mark_absent(&mut self, identity: PackageIdentity) {
        self.absent.insert(identity);
    }

    /// Fetching dependencies of `identity` fails with a network error.
    pub fn fail_dependencies(&mut self, identity: PackageIdentity) {
        self.failing_dependencies.insert(identity);
    }

    /// Downloading `identity` fails with a network error.
    pub fn fail_artifact(&mut self, identity: PackageIdentity) {
        self.failing_artifacts.insert(identity);
    }

    /// Dependency information for `identity` carries a range that does not
    /// parse.
    pub fn malform_dependencies(&mut self, identity: PackageIdentity) {
        self.malformed_dependencies.insert(identity);
    }

    /// Fetching dependencies of `identity` never completes.
    pub fn stall_dependencies(&mut self, identity: PackageIdentity) {
        self.stalled_dependencies.insert(identity);
    }

    /// Downloading `identity` writes [`Self::PARTIAL_ARTIFACT`] and then
    /// never completes.
    pub fn stall_artifact(&mut self, identity: PackageIdentity) {
        self.stalled_artifacts.insert(identity);
    }

    pub const PARTIAL_ARTIFACT: &'static [u8] = b"partial";

    /// How many times dependencies of `identity` were requested.
    pub fn dependency_fetches(&self, identity: &PackageIdentity) -> usize {
        self.fetch_counts().get(identity).copied().unwrap_or(0)
    }

    pub fn total_dependency_fetches(&self) -> usize {
        self.fetch_counts().values().sum()
    }

    fn fetch_counts(&self) -> std::sync::MutexGuard<'_, HashMap<PackageIdentity, usize>> {
        self.dependency_fetches
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Artifact content served for `identity`.
    pub fn artifact_bytes(identity: &PackageIdentity) -> Vec<u8> {
        format!("nupkg:{}", identity.file_name()).into_bytes()
    }

    fn simulated_failure(identity: &PackageIdentity, what: &str) -> RegistryError {
        RegistryError::Network {
            url: format!("memory://{}", identity.file_name()),
            message: format!("simulated {what} failure"),
        }
    }
}

#[async_trait]
impl PackageRegistry for InMemoryRegistry {
    fn source(&self) -> &str {
        "memory://"
    }

    async fn list_versions(&self, id: &PackageId) -> Result<Vec<NuGetVersion>, RegistryError> {
        Ok(self.packages.get(id).cloned().unwrap_or_default())
    }

    async fn fetch_dependencies(
        &self,
        identity: &PackageIdentity,
        _framework: &TargetFramework,
    ) -> Result<Option<Vec<DependencyEdge>>, RegistryError> {
        *self.fetch_counts().entry(identity.clone()).or_insert(0) += 1;

        if self.failing_dependencies.contains(identity) {
            return Err(Self::simulated_failure(identity, "dependency fetch"));
        }
        if self.malformed_dependencies.contains(identity) {
            return Err(RegistryError::Core(CoreError::InvalidRange {
                input: "[1.0.0-*, )".to_string(),
                reason: "simulated malformed range".to_string(),
            }));
        }
        if self.stalled_dependencies.contains(identity) {
            std::future::pending::<()>().await;
        }
        if self.absent.contains(identity) {
            return Ok(None);
        }
        Ok(self.dependencies.get(identity).cloned())
    }

    async fn stream_artifact(
        &self,
        identity: &PackageIdentity,
        sink: &mut tokio::fs::File,
    ) -> Result<u64, RegistryError> {
        if self.failing_artifacts.contains(identity) {
            return Err(Self::simulated_failure(identity, "download"));
        }
        if !self.dependencies.contains_key(identity) {
            return Err(RegistryError::not_found(identity));
        }
        if self.stalled_artifacts.contains(identity) {
            sink.write_all(Self::PARTIAL_ARTIFACT).await?;
            sink.flush().await?;
            std::future::pending::<()>().await;
        }
        let bytes = Self::artifact_bytes(identity);
        sink.write_all(&bytes).await?;
        Ok(bytes.len() as u64)
    }
}
