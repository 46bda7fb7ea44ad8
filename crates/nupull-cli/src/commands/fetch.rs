//! Handler for `nupull fetch`.

use std::path::PathBuf;

use miette::Result;
use nupull_util::errors::NupullError;
use tokio_util::sync::CancellationToken;

use super::{load_settings, package_overrides};
use crate::cli::PackageArgs;

pub async fn exec(
    package: PackageArgs,
    output: Option<PathBuf>,
    jobs: Option<usize>,
    cancel: &CancellationToken,
) -> Result<()> {
    let mut overrides = package_overrides(&package);
    overrides.output_dir = output;
    overrides.jobs = jobs;
    let settings = load_settings(overrides)?;
    let registry = settings.registry()?;

    let version = package.package_version.map(|v| v.to_string());
    let summary = nupull_ops::ops_fetch::fetch(
        registry,
        &package.package_id,
        version.as_deref(),
        &settings,
        cancel,
        package.json,
    )
    .await?;

    if summary.failed > 0 {
        return Err(NupullError::Download {
            message: format!("{} of {} packages failed", summary.failed, summary.total),
        }
        .into());
    }
    Ok(())
}
