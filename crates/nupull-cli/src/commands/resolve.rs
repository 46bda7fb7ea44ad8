//! Handler for `nupull resolve`.

use miette::Result;
use tokio_util::sync::CancellationToken;

use super::{load_settings, package_overrides};
use crate::cli::PackageArgs;

pub async fn exec(package: PackageArgs, cancel: &CancellationToken) -> Result<()> {
    let settings = load_settings(package_overrides(&package))?;
    let registry = settings.registry()?;
    let version = package.package_version.map(|v| v.to_string());
    nupull_ops::ops_resolve::resolve(
        registry.as_ref(),
        &package.package_id,
        version.as_deref(),
        &settings,
        cancel,
        package.json,
    )
    .await?;
    Ok(())
}
