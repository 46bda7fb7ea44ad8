//! Operation: resolve a package's dependency closure without downloading.

use nupull_core::identity::PackageId;
use nupull_registry::PackageRegistry;
use nupull_resolver::resolver::{self, ResolutionResult};
use nupull_util::errors::NupullError;
use nupull_util::progress::{hidden, spinner, status, status_info, status_warn};
use tokio_util::sync::CancellationToken;

use crate::settings::Settings;

/// Resolve `id` and print the resulting package set, one identity per
/// line on stdout (or as JSON).
pub async fn resolve(
    registry: &dyn PackageRegistry,
    id: &PackageId,
    version: Option<&str>,
    settings: &Settings,
    cancel: &CancellationToken,
    json: bool,
) -> miette::Result<ResolutionResult> {
    if !json {
        status_info("Source", registry.source());
    }
    let sp = if json {
        hidden()
    } else {
        spinner(&format!("Resolving {id}..."))
    };
    let result = async {
        let root = resolver::resolve_root(registry, id, version, cancel).await?;
        resolver::resolve(registry, root, &settings.framework, cancel).await
    }
    .await;
    sp.finish_and_clear();
    let result = result?;

    if json {
        let out = serde_json::to_string_pretty(&result).map_err(|e| NupullError::Generic {
            message: format!("Failed to serialize resolution: {e}"),
        })?;
        println!("{out}");
        return Ok(result);
    }

    for package in &result.packages {
        println!("{package}");
    }
    report_warnings(&result);
    status(
        "Resolved",
        &format!(
            "{} unique packages for {} ({} without dependency info)",
            result.packages.len(),
            settings.framework,
            result.absent.len()
        ),
    );
    Ok(result)
}

/// Warning lines for a resolution: skipped edges, then ids resolved at more
/// than one version.
pub(crate) fn warning_lines(result: &ResolutionResult) -> Vec<(&'static str, String)> {
    let skipped = result.unresolved.iter().map(|edge| {
        (
            "Skipped",
            format!("{} (required by {}): {}", edge.edge, edge.from, edge.reason),
        )
    });
    let spread = result
        .spread
        .entries
        .iter()
        .map(|entry| ("Spread", entry.to_string()));
    skipped.chain(spread).collect()
}

pub(crate) fn report_warnings(result: &ResolutionResult) {
    for (label, message) in warning_lines(result) {
        status_warn(label, &message);
    }
}
