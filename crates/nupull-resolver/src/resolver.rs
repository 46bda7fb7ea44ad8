//! Breadth-first dependency resolution under the minimum-version policy.
//!
//! Every edge is pinned to the lowest version its range allows: the
//! inclusive lower bound when there is one, otherwise the lowest published
//! version inside the range. Versions are never unified, so an id can
//! appear more than once at different versions (see [`crate::spread`]).

use std::collections::VecDeque;
use std::future::Future;

use nupull_core::dependency::DependencyEdge;
use nupull_core::framework::TargetFramework;
use nupull_core::identity::{PackageId, PackageIdentity};
use nupull_core::resolved::ResolvedSet;
use nupull_registry::{PackageRegistry, RegistryError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::ResolveError;
use crate::spread::SpreadReport;

/// The output of dependency resolution.
#[derive(Debug, Serialize)]
pub struct ResolutionResult {
    pub root: PackageIdentity,
    /// Every identity reached, root first, in breadth-first order.
    pub packages: ResolvedSet,
    /// Identities kept in the set whose dependencies could not be read.
    pub absent: Vec<PackageIdentity>,
    /// Edges no version could be chosen for.
    pub unresolved: Vec<UnresolvedEdge>,
    pub spread: SpreadReport,
}

/// A dependency edge skipped because it could not be pinned to a version.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedEdge {
    pub from: PackageIdentity,
    pub edge: DependencyEdge,
    pub reason: String,
}

/// Turn the requested id and optional version into the root identity.
pub async fn resolve_root(
    registry: &dyn PackageRegistry,
    id: &PackageId,
    version: Option<&str>,
    cancel: &CancellationToken,
) -> Result<PackageIdentity, ResolveError> {
    if cancel.is_cancelled() {
        return Err(ResolveError::Cancelled);
    }
    let package = match version {
        Some(v) => format!("{id} {v}"),
        None => id.to_string(),
    };
    cancellable(cancel, registry.resolve_identity(id, version))
        .await
        .map_err(|e| ResolveError::from_root(package, e))
}

/// Walk the dependency graph from `root` for `framework`.
///
/// A failure reading the root's own dependencies is fatal. Below the root,
/// failures and missing dependency information are logged, the node stays
/// in the set, and its subtree is not expanded.
pub async fn resolve(
    registry: &dyn PackageRegistry,
    root: PackageIdentity,
    framework: &TargetFramework,
    cancel: &CancellationToken,
) -> Result<ResolutionResult, ResolveError> {
    let mut packages = ResolvedSet::new();
    let mut absent = Vec::new();
    let mut unresolved = Vec::new();
    let mut queue: VecDeque<PackageIdentity> = VecDeque::new();
    queue.push_back(root.clone());

    while let Some(candidate) = queue.pop_front() {
        if !packages.insert(candidate.clone()) {
            continue;
        }
        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        tracing::debug!("Expanding {candidate}");
        let fetched = cancellable(cancel, registry.fetch_dependencies(&candidate, framework)).await;
        let edges = match fetched {
            Ok(Some(edges)) => edges,
            Ok(None) => {
                tracing::warn!("No dependency information for {candidate}; treating it as a leaf");
                absent.push(candidate);
                continue;
            }
            Err(RegistryError::Cancelled) => return Err(ResolveError::Cancelled),
            Err(e) if candidate == root => {
                return Err(ResolveError::from_root_dependencies(&candidate, e));
            }
            Err(e) => {
                tracing::warn!("Failed to read dependencies of {candidate}: {e}");
                absent.push(candidate);
                continue;
            }
        };

        for edge in edges {
            match pin(registry, &edge, cancel).await? {
                Ok(dependency) => {
                    if packages.contains(&dependency) {
                        continue;
                    }
                    tracing::debug!("{candidate} -> {dependency} (from {})", edge.range);
                    queue.push_back(dependency);
                }
                Err(reason) => {
                    tracing::warn!("Skipping {edge} required by {candidate}: {reason}");
                    unresolved.push(UnresolvedEdge {
                        from: candidate.clone(),
                        edge,
                        reason,
                    });
                }
            }
        }
    }

    tracing::info!("Resolved {} packages from {root}", packages.len());
    let spread = SpreadReport::from_resolved(&packages);
    Ok(ResolutionResult {
        root,
        packages,
        absent,
        unresolved,
        spread,
    })
}

/// Choose the concrete version for an edge.
///
/// The outer error aborts resolution; the inner one explains why this edge
/// is skipped.
async fn pin(
    registry: &dyn PackageRegistry,
    edge: &DependencyEdge,
    cancel: &CancellationToken,
) -> Result<Result<PackageIdentity, String>, ResolveError> {
    if let Some(floor) = edge.range.floor() {
        return Ok(Ok(PackageIdentity::new(edge.id.clone(), floor.clone())));
    }

    // No inclusive floor: the lowest published version inside the range.
    if cancel.is_cancelled() {
        return Err(ResolveError::Cancelled);
    }
    let versions = match cancellable(cancel, registry.list_versions(&edge.id)).await {
        Ok(versions) => versions,
        Err(RegistryError::Cancelled) => return Err(ResolveError::Cancelled),
        Err(e) => return Ok(Err(format!("failed to list versions: {e}"))),
    };
    Ok(match edge.range.lowest_match(&versions) {
        Some(version) => Ok(PackageIdentity::new(edge.id.clone(), version.clone())),
        None => Err(format!("no published version satisfies {}", edge.range)),
    })
}

/// Race a registry call against cancellation so Ctrl-C does not wait out
/// HTTP timeouts and retries.
async fn cancellable<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = Result<T, RegistryError>>,
) -> Result<T, RegistryError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(RegistryError::Cancelled),
        result = call => result,
    }
}
