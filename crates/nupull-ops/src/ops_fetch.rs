//! Operation: resolve a package's dependency closure and download it.

use std::sync::Arc;

use nupull_core::identity::PackageId;
use nupull_registry::PackageRegistry;
use nupull_resolver::resolver;
use nupull_util::errors::NupullError;
use nupull_util::progress::{
    hidden, progress_bar, spinner, status, status_error, status_info, status_warn,
};
use tokio_util::sync::CancellationToken;

use crate::ops_download::{download_all, DownloadSummary};
use crate::ops_resolve::report_warnings;
use crate::settings::Settings;

/// Fetch `id` (at `version`, or the latest) and everything it depends on
/// into the configured output directory.
///
/// With `json`, the summary goes to stdout as JSON and no status lines or
/// progress bars are drawn. Returns the summary even when items failed;
/// a cancelled run prints the summary and then fails.
pub async fn fetch(
    registry: Arc<dyn PackageRegistry>,
    id: &PackageId,
    version: Option<&str>,
    settings: &Settings,
    cancel: &CancellationToken,
    json: bool,
) -> miette::Result<DownloadSummary> {
    if !json {
        status_info("Source", registry.source());
    }
    let sp = if json {
        hidden()
    } else {
        spinner(&format!("Resolving {id}..."))
    };
    let root = resolver::resolve_root(registry.as_ref(), id, version, cancel).await;
    sp.finish_and_clear();
    let root = root?;
    if !json {
        status("Found", &root.to_string());
    }

    let sp = if json {
        hidden()
    } else {
        spinner(&format!("Resolving dependencies for {}...", settings.framework))
    };
    let result = resolver::resolve(registry.as_ref(), root, &settings.framework, cancel).await;
    sp.finish_and_clear();
    let result = result?;

    let total = result.packages.len();
    if !json {
        status("Resolved", &format!("{total} unique packages"));
        report_warnings(&result);
    }

    let pb = if json {
        hidden()
    } else {
        progress_bar(total as u64, "Downloading")
    };
    let summary = download_all(
        registry,
        result.packages.as_slice(),
        &settings.output_dir,
        settings.jobs,
        cancel,
        &pb,
    )
    .await?;
    pb.finish_and_clear();

    if json {
        let out = serde_json::to_string_pretty(&summary).map_err(|e| NupullError::Generic {
            message: format!("Failed to serialize summary: {e}"),
        })?;
        println!("{out}");
    } else {
        print_summary(&summary, &settings.output_dir.display().to_string());
    }

    if cancel.is_cancelled() {
        return Err(NupullError::Cancelled.into());
    }
    Ok(summary)
}

fn print_summary(summary: &DownloadSummary, output_dir: &str) {
    for (package, reason) in summary.failures() {
        status_error("Failed", &format!("{package}: {reason}"));
    }
    let message = format!(
        "{} of {} packages into {output_dir} ({} downloaded, {} already present, {} failed)",
        summary.succeeded,
        summary.total,
        summary.downloaded(),
        summary.already_present(),
        summary.failed
    );
    if summary.failed == 0 {
        status("Fetched", &message);
    } else {
        status_warn("Fetched", &message);
    }
}
