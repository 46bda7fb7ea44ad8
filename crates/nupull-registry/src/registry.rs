//! The registry contract shared by the NuGet client and the in-memory fake.

use std::path::Path;

use async_trait::async_trait;
use nupull_core::dependency::DependencyEdge;
use nupull_core::framework::TargetFramework;
use nupull_core::identity::{PackageId, PackageIdentity};
use nupull_core::version::{latest_version, NuGetVersion};
use nupull_util::fs::{is_complete_file, part_path, remove_quietly};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use crate::error::RegistryError;

/// What [`PackageRegistry::download_artifact`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// The artifact was streamed to disk; carries the byte count.
    Written(u64),
    /// A complete file was already at the destination and was left alone.
    AlreadyPresent,
}

#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Where packages come from, for logs and reports.
    fn source(&self) -> &str;

    /// Every published version of `id`. Unknown ids have none.
    async fn list_versions(&self, id: &PackageId) -> Result<Vec<NuGetVersion>, RegistryError>;

    /// Dependencies `identity` declares for the group nearest to `framework`.
    ///
    /// `Ok(None)` means the registry has no dependency information for this
    /// identity; callers treat it as a leaf.
    async fn fetch_dependencies(
        &self,
        identity: &PackageIdentity,
        framework: &TargetFramework,
    ) -> Result<Option<Vec<DependencyEdge>>, RegistryError>;

    /// Stream the artifact bytes into `sink`, returning the byte count.
    async fn stream_artifact(
        &self,
        identity: &PackageIdentity,
        sink: &mut tokio::fs::File,
    ) -> Result<u64, RegistryError>;

    async fn exists(&self, identity: &PackageIdentity) -> Result<bool, RegistryError> {
        let versions = self.list_versions(&identity.id).await?;
        Ok(versions.contains(&identity.version))
    }

    /// Turn a user request into a concrete identity.
    ///
    /// With a version, the version must parse and be published. Without
    /// one, the latest stable version is chosen, or the latest pre-release
    /// when nothing stable exists.
    async fn resolve_identity(
        &self,
        id: &PackageId,
        version: Option<&str>,
    ) -> Result<PackageIdentity, RegistryError> {
        match version {
            Some(v) => {
                let identity = PackageIdentity::new(id.clone(), NuGetVersion::parse(v)?);
                if self.exists(&identity).await? {
                    Ok(identity)
                } else {
                    Err(RegistryError::not_found(&identity))
                }
            }
            None => {
                let versions = self.list_versions(id).await?;
                let latest =
                    latest_version(&versions).ok_or_else(|| RegistryError::not_found(id))?;
                Ok(PackageIdentity::new(id.clone(), latest.clone()))
            }
        }
    }

    /// Download the artifact into `dest_dir` under its normalized file name.
    ///
    /// Bytes go to a `.part` file that is renamed into place once complete,
    /// so an interrupted download never leaves a file that looks finished.
    /// An existing non-empty file is kept and reported as
    /// [`DownloadStatus::AlreadyPresent`].
    async fn download_artifact(
        &self,
        identity: &PackageIdentity,
        dest_dir: &Path,
        cancel: &CancellationToken,
    ) -> Result<DownloadStatus, RegistryError> {
        let dest = dest_dir.join(identity.file_name());
        if is_complete_file(&dest) {
            tracing::debug!("{} already present", dest.display());
            return Ok(DownloadStatus::AlreadyPresent);
        }
        if cancel.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }

        let part = part_path(&dest);
        let result: Result<u64, RegistryError> = async {
            let mut file = tokio::fs::File::create(&part).await?;
            let written = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RegistryError::Cancelled),
                r = self.stream_artifact(identity, &mut file) => r?,
            };
            if written == 0 {
                return Err(RegistryError::InvalidResponse {
                    url: self.source().to_string(),
                    message: format!("empty artifact for {identity}"),
                });
            }
            file.flush().await?;
            drop(file);
            tokio::fs::rename(&part, &dest).await?;
            Ok(written)
        }
        .await;

        match result {
            Ok(written) => {
                tracing::debug!("Wrote {} ({written} bytes)", dest.display());
                Ok(DownloadStatus::Written(written))
            }
            Err(e) => {
                remove_quietly(&part);
                Err(e)
            }
        }
    }
}
