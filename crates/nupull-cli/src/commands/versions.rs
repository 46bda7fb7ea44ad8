//! Handler for `nupull versions`.

use miette::Result;
use nupull_core::identity::PackageId;
use nupull_ops::settings::Overrides;

use super::load_settings;

pub async fn exec(id: &PackageId, prerelease: bool, source: Option<String>) -> Result<()> {
    let settings = load_settings(Overrides {
        source,
        ..Overrides::default()
    })?;
    let registry = settings.registry()?;
    nupull_ops::ops_versions::versions(registry.as_ref(), id, prerelease).await
}
