//! Operation: list the published versions of a package.

use nupull_core::identity::PackageId;
use nupull_core::version::NuGetVersion;
use nupull_registry::PackageRegistry;
use nupull_util::errors::NupullError;

/// Published versions of `id`, oldest first. Pre-releases are dropped
/// unless `include_prerelease` is set.
pub async fn list_versions(
    registry: &dyn PackageRegistry,
    id: &PackageId,
    include_prerelease: bool,
) -> miette::Result<Vec<NuGetVersion>> {
    let mut versions = registry.list_versions(id).await?;
    if versions.is_empty() {
        return Err(NupullError::Generic {
            message: format!("No versions of {id} published on {}", registry.source()),
        }
        .into());
    }
    if !include_prerelease {
        versions.retain(|v| !v.is_prerelease());
    }
    versions.sort();
    versions.dedup();
    Ok(versions)
}

/// Print versions one per line on stdout.
pub async fn versions(
    registry: &dyn PackageRegistry,
    id: &PackageId,
    include_prerelease: bool,
) -> miette::Result<()> {
    for version in list_versions(registry, id, include_prerelease).await? {
        println!("{version}");
    }
    Ok(())
}
