use std::time::Duration;

use nupull_core::dependency::DependencyEdge;
use nupull_core::framework::TargetFramework;
use nupull_core::identity::{PackageId, PackageIdentity};
use nupull_core::version::{NuGetVersion, VersionRange};
use nupull_registry::{DownloadStatus, InMemoryRegistry, PackageRegistry, RegistryError};
use tokio_util::sync::CancellationToken;

fn identity(id: &str, version: &str) -> PackageIdentity {
    PackageIdentity::new(id, NuGetVersion::parse(version).unwrap())
}

fn registry_with_versions(id: &str, versions: &[&str]) -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();
    for v in versions {
        registry.add_package(identity(id, v), Vec::new());
    }
    registry
}

#[tokio::test]
async fn test_resolve_identity_latest_stable() {
    let registry = registry_with_versions("Lib", &["1.0.0", "1.1.0-beta", "2.0.0", "2.1.0-beta"]);
    let resolved = registry
        .resolve_identity(&PackageId::from("Lib"), None)
        .await
        .unwrap();
    assert_eq!(resolved, identity("Lib", "2.0.0"));
}

#[tokio::test]
async fn test_resolve_identity_prerelease_fallback() {
    let registry = registry_with_versions("Lib", &["1.1.0-beta", "2.1.0-beta"]);
    let resolved = registry
        .resolve_identity(&PackageId::from("lib"), None)
        .await
        .unwrap();
    assert_eq!(resolved.version.to_string(), "2.1.0-beta");
}

#[tokio::test]
async fn test_resolve_identity_explicit_version() {
    let registry = registry_with_versions("Lib", &["1.0.0", "2.0.0"]);
    let id = PackageId::from("Lib");

    let resolved = registry.resolve_identity(&id, Some("1.0")).await.unwrap();
    assert_eq!(resolved, identity("Lib", "1.0.0"));

    let err = registry.resolve_identity(&id, Some("3.0.0")).await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");

    let err = registry.resolve_identity(&id, Some("not.a.version")).await.unwrap_err();
    assert!(matches!(err, RegistryError::Core(_)), "got {err:?}");
}

#[tokio::test]
async fn test_resolve_identity_unknown_package() {
    let registry = InMemoryRegistry::new();
    let err = registry
        .resolve_identity(&PackageId::from("Nope"), None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_fetch_dependencies_switches() {
    let mut registry = InMemoryRegistry::new();
    let a = identity("A", "1.0.0");
    registry.add_package(
        a.clone(),
        vec![DependencyEdge::new("B", VersionRange::parse("[1.0.0, )").unwrap())],
    );
    let fw = TargetFramework::parse("net8.0");

    let deps = registry.fetch_dependencies(&a, &fw).await.unwrap().unwrap();
    assert_eq!(deps.len(), 1);

    registry.mark_absent(a.clone());
    assert!(registry.fetch_dependencies(&a, &fw).await.unwrap().is_none());

    registry.fail_dependencies(a.clone());
    assert!(registry.fetch_dependencies(&a, &fw).await.is_err());

    assert_eq!(registry.dependency_fetches(&a), 3);
}

#[tokio::test]
async fn test_download_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = registry_with_versions("Lib", &["1.0.0"]);
    let lib = identity("Lib", "1.0.0");
    let token = CancellationToken::new();

    let first = registry.download_artifact(&lib, tmp.path(), &token).await.unwrap();
    let expected = InMemoryRegistry::artifact_bytes(&lib);
    assert_eq!(first, DownloadStatus::Written(expected.len() as u64));

    let second = registry.download_artifact(&lib, tmp.path(), &token).await.unwrap();
    assert_eq!(second, DownloadStatus::AlreadyPresent);

    let entries: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    let written = std::fs::read(tmp.path().join("lib.1.0.0.nupkg")).unwrap();
    assert_eq!(written, expected);
}

#[tokio::test]
async fn test_empty_existing_file_is_replaced() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = registry_with_versions("Lib", &["1.0.0"]);
    let lib = identity("Lib", "1.0.0");
    std::fs::write(tmp.path().join(lib.file_name()), b"").unwrap();

    let status = registry
        .download_artifact(&lib, tmp.path(), &CancellationToken::new())
        .await
        .unwrap();
    assert!(matches!(status, DownloadStatus::Written(_)));
}

#[tokio::test]
async fn test_failed_download_leaves_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let mut registry = registry_with_versions("Lib", &["1.0.0"]);
    let lib = identity("Lib", "1.0.0");
    registry.fail_artifact(lib.clone());

    let err = registry
        .download_artifact(&lib, tmp.path(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Network { .. }));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_cancelled_before_download_leaves_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let registry = registry_with_versions("Lib", &["1.0.0"]);
    let token = CancellationToken::new();
    token.cancel();

    let err = registry
        .download_artifact(&identity("Lib", "1.0.0"), tmp.path(), &token)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Cancelled));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_cancel_mid_stream_removes_part_file() {
    let tmp = tempfile::tempdir().unwrap();
    let mut registry = registry_with_versions("Lib", &["1.0.0"]);
    let lib = identity("Lib", "1.0.0");
    registry.stall_artifact(lib.clone());
    let part = nupull_util::fs::part_path(&tmp.path().join(lib.file_name()));
    let token = CancellationToken::new();

    let cancel_once_partial = async {
        while std::fs::read(&part).unwrap_or_default() != InMemoryRegistry::PARTIAL_ARTIFACT {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        token.cancel();
    };
    let (result, ()) = tokio::time::timeout(Duration::from_secs(5), async {
        tokio::join!(
            registry.download_artifact(&lib, tmp.path(), &token),
            cancel_once_partial
        )
    })
    .await
    .expect("download should stop on cancellation");

    assert!(matches!(result, Err(RegistryError::Cancelled)), "got {result:?}");
    assert!(!part.exists());
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}
