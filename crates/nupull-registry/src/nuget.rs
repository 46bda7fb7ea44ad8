//! NuGet V3 feed client.

use async_trait::async_trait;
use futures_util::StreamExt;
use nupull_core::dependency::DependencyEdge;
use nupull_core::framework::TargetFramework;
use nupull_core::identity::{PackageId, PackageIdentity};
use nupull_core::version::NuGetVersion;
use reqwest::Client;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::OnceCell;

use crate::error::RegistryError;
use crate::http::{self, HttpSettings};
use crate::registration::{find_entry, RegistrationIndex, RegistrationPage};
use crate::registry::PackageRegistry;
use crate::service_index::{ServiceIndex, PACKAGE_BASE_ADDRESS};

/// Resource URLs read from the service index.
#[derive(Debug, Clone)]
struct Resources {
    flat_container: String,
    registrations: String,
}

/// `{flat}/{id}/index.json`
#[derive(Debug, Deserialize)]
struct VersionList {
    #[serde(default)]
    versions: Vec<String>,
}

/// A NuGet V3 feed reached over HTTPS.
pub struct NuGetRegistry {
    source: String,
    client: Client,
    retries: u32,
    resources: OnceCell<Resources>,
}

impl NuGetRegistry {
    /// Create a client for the feed whose service index is at `source`.
    /// Nothing is fetched until the first call.
    pub fn new(source: impl Into<String>, settings: &HttpSettings) -> Result<Self, RegistryError> {
        Ok(Self {
            source: source.into(),
            client: http::build_client(settings)?,
            retries: settings.retries,
            resources: OnceCell::new(),
        })
    }

    async fn resources(&self) -> Result<&Resources, RegistryError> {
        self.resources
            .get_or_try_init(|| async {
                tracing::debug!("Fetching service index {}", self.source);
                let index: ServiceIndex = http::get_json(&self.client, &self.source, self.retries)
                    .await?
                    .ok_or_else(|| self.invalid("service index not found"))?;
                let flat_container = index
                    .package_base_address()
                    .ok_or_else(|| self.invalid(&format!("no {PACKAGE_BASE_ADDRESS} resource")))?;
                let registrations = index
                    .registrations_base_url()
                    .ok_or_else(|| self.invalid("no RegistrationsBaseUrl resource"))?;
                Ok::<_, RegistryError>(Resources {
                    flat_container: flat_container.to_string(),
                    registrations: registrations.to_string(),
                })
            })
            .await
    }

    fn invalid(&self, message: &str) -> RegistryError {
        RegistryError::InvalidResponse {
            url: self.source.clone(),
            message: message.to_string(),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<Option<RegistrationPage>, RegistryError> {
        http::get_json(&self.client, url, self.retries).await
    }
}

pub(crate) fn versions_url(flat_container: &str, id: &PackageId) -> String {
    format!("{flat_container}/{}/index.json", id.to_lowercase())
}

/// `{flat}/{id}/{version}/{id}.{version}.nupkg`, all lowercase.
pub(crate) fn artifact_url(flat_container: &str, identity: &PackageIdentity) -> String {
    let id = identity.id.to_lowercase();
    let version = identity.version.to_normalized_string().to_ascii_lowercase();
    format!("{flat_container}/{id}/{version}/{}", identity.file_name())
}

pub(crate) fn registration_url(registrations: &str, id: &PackageId) -> String {
    format!("{registrations}/{}/index.json", id.to_lowercase())
}

#[async_trait]
impl PackageRegistry for NuGetRegistry {
    fn source(&self) -> &str {
        &self.source
    }

    async fn list_versions(&self, id: &PackageId) -> Result<Vec<NuGetVersion>, RegistryError> {
        let resources = self.resources().await?;
        let url = versions_url(&resources.flat_container, id);
        let Some(list) = http::get_json::<VersionList>(&self.client, &url, self.retries).await?
        else {
            return Ok(Vec::new());
        };
        Ok(list
            .versions
            .iter()
            .filter_map(|v| match NuGetVersion::parse(v) {
                Ok(version) => Some(version),
                Err(e) => {
                    tracing::warn!("Skipping unparsable version of {id}: {e}");
                    None
                }
            })
            .collect())
    }

    async fn fetch_dependencies(
        &self,
        identity: &PackageIdentity,
        framework: &TargetFramework,
    ) -> Result<Option<Vec<DependencyEdge>>, RegistryError> {
        let resources = self.resources().await?;
        let url = registration_url(&resources.registrations, &identity.id);
        let Some(index) =
            http::get_json::<RegistrationIndex>(&self.client, &url, self.retries).await?
        else {
            tracing::debug!("No registration for {}", identity.id);
            return Ok(None);
        };

        for page in &index.items {
            if !page.may_contain(&identity.version) {
                continue;
            }
            let entry = match &page.items {
                Some(leaves) => find_entry(leaves, &identity.version).cloned(),
                None => match self.fetch_page(&page.id).await? {
                    Some(fetched) => fetched
                        .items
                        .as_deref()
                        .and_then(|leaves| find_entry(leaves, &identity.version))
                        .cloned(),
                    None => None,
                },
            };
            if let Some(entry) = entry {
                return Ok(Some(entry.dependencies_for(framework)));
            }
        }

        tracing::debug!("No registration leaf for {identity}");
        Ok(None)
    }

    async fn stream_artifact(
        &self,
        identity: &PackageIdentity,
        sink: &mut tokio::fs::File,
    ) -> Result<u64, RegistryError> {
        let resources = self.resources().await?;
        let url = artifact_url(&resources.flat_container, identity);
        let resp = http::get(&self.client, &url, self.retries)
            .await?
            .ok_or_else(|| RegistryError::not_found(identity))?;

        let mut stream = resp.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| RegistryError::Network {
                url: url.clone(),
                message: format!("Failed while reading body: {e}"),
            })?;
            sink.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }
}
