//! Operation: download a resolved set of packages with bounded parallelism.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::ProgressBar;
use nupull_core::identity::PackageIdentity;
use nupull_registry::{DownloadStatus, PackageRegistry, RegistryError};
use nupull_util::errors::NupullError;
use nupull_util::fs::ensure_dir;
use nupull_util::hash::sha512_file;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Reason recorded for items that never ran because the run was cancelled.
pub const CANCELLED_REASON: &str = "cancelled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum DownloadOutcome {
    Downloaded { bytes: u64, sha512: String },
    AlreadyPresent { sha512: String },
    Failed { reason: String },
}

impl DownloadOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DownloadOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    pub package: PackageIdentity,
    pub file: String,
    #[serde(flatten)]
    pub outcome: DownloadOutcome,
}

/// Per-run totals plus one report per package, in resolution order.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<ItemReport>,
}

impl DownloadSummary {
    fn from_items(items: Vec<ItemReport>) -> Self {
        let failed = items.iter().filter(|i| i.outcome.is_failure()).count();
        Self {
            total: items.len(),
            succeeded: items.len() - failed,
            failed,
            items,
        }
    }

    pub fn downloaded(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::Downloaded { .. }))
    }

    pub fn already_present(&self) -> usize {
        self.count(|o| matches!(o, DownloadOutcome::AlreadyPresent { .. }))
    }

    fn count(&self, pred: impl Fn(&DownloadOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }

    /// Failed packages with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = (&PackageIdentity, &str)> {
        self.items.iter().filter_map(|i| match &i.outcome {
            DownloadOutcome::Failed { reason } => Some((&i.package, reason.as_str())),
            _ => None,
        })
    }
}

/// Download every package into `dest`, at most `jobs` at a time.
///
/// Per-package failures are recorded in the summary and never stop the run.
/// Only failing to create `dest` is an error.
pub async fn download_all(
    registry: Arc<dyn PackageRegistry>,
    packages: &[PackageIdentity],
    dest: &Path,
    jobs: usize,
    cancel: &CancellationToken,
    progress: &ProgressBar,
) -> miette::Result<DownloadSummary> {
    ensure_dir(dest).map_err(|e| NupullError::Download {
        message: format!("Cannot create output directory {}: {e}", dest.display()),
    })?;

    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut join_set = JoinSet::new();

    for (index, identity) in packages.iter().enumerate() {
        let registry = registry.clone();
        let identity = identity.clone();
        let dest = dest.to_path_buf();
        let cancel = cancel.clone();
        let sem = semaphore.clone();
        join_set.spawn(async move {
            let outcome = match sem.acquire().await {
                Ok(_permit) if cancel.is_cancelled() => failed(CANCELLED_REASON),
                Ok(_permit) => download_one(registry.as_ref(), &identity, &dest, &cancel).await,
                Err(_) => failed("download queue closed"),
            };
            (index, outcome)
        });
    }

    let mut outcomes: Vec<Option<DownloadOutcome>> = vec![None; packages.len()];
    while let Some(result) = join_set.join_next().await {
        match result {
            Ok((index, outcome)) => {
                if let DownloadOutcome::Failed { reason } = &outcome {
                    tracing::warn!("Failed to download {}: {reason}", packages[index]);
                }
                outcomes[index] = Some(outcome);
            }
            Err(e) => tracing::error!("Download task failed: {e}"),
        }
        progress.inc(1);
    }

    let items = packages
        .iter()
        .zip(outcomes)
        .map(|(package, outcome)| ItemReport {
            file: package.file_name(),
            package: package.clone(),
            outcome: outcome.unwrap_or_else(|| failed("download task failed")),
        })
        .collect();
    Ok(DownloadSummary::from_items(items))
}

async fn download_one(
    registry: &dyn PackageRegistry,
    identity: &PackageIdentity,
    dest: &Path,
    cancel: &CancellationToken,
) -> DownloadOutcome {
    let path: PathBuf = dest.join(identity.file_name());
    match registry.download_artifact(identity, dest, cancel).await {
        Ok(status) => {
            let hash_path = path.clone();
            match tokio::task::spawn_blocking(move || sha512_file(&hash_path)).await {
                Ok(Ok(sha512)) => match status {
                    DownloadStatus::Written(bytes) => DownloadOutcome::Downloaded { bytes, sha512 },
                    DownloadStatus::AlreadyPresent => DownloadOutcome::AlreadyPresent { sha512 },
                },
                Ok(Err(e)) => failed(&format!("cannot hash {}: {e}", path.display())),
                Err(e) => failed(&format!("hashing task failed: {e}")),
            }
        }
        Err(RegistryError::Cancelled) => failed(CANCELLED_REASON),
        Err(e) => failed(&e.to_string()),
    }
}

fn failed(reason: &str) -> DownloadOutcome {
    DownloadOutcome::Failed {
        reason: reason.to_string(),
    }
}
