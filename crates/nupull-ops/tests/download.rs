use std::sync::Arc;

use nupull_core::identity::PackageIdentity;
use nupull_core::version::NuGetVersion;
use nupull_ops::ops_download::{download_all, DownloadOutcome, CANCELLED_REASON};
use nupull_registry::{InMemoryRegistry, PackageRegistry};
use nupull_util::hash::sha512_bytes;
use nupull_util::progress::hidden;
use tokio_util::sync::CancellationToken;

fn identity(id: &str, version: &str) -> PackageIdentity {
    PackageIdentity::new(id, NuGetVersion::parse(version).unwrap())
}

fn five_packages() -> Vec<PackageIdentity> {
    ["A", "B", "C", "D", "E"]
        .iter()
        .map(|id| identity(id, "1.0.0"))
        .collect()
}

fn registry_with(packages: &[PackageIdentity], failing: &[&str]) -> Arc<dyn PackageRegistry> {
    let mut registry = InMemoryRegistry::new();
    for p in packages {
        registry.add_package(p.clone(), vec![]);
        if failing.contains(&p.id.as_str()) {
            registry.fail_artifact(p.clone());
        }
    }
    Arc::new(registry)
}

#[tokio::test]
async fn test_failures_are_isolated() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = five_packages();
    let registry = registry_with(&packages, &["B", "D"]);

    let summary = download_all(
        registry,
        &packages,
        tmp.path(),
        2,
        &CancellationToken::new(),
        &hidden(),
    )
    .await
    .unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 2);
    let failed: Vec<String> = summary.failures().map(|(p, _)| p.to_string()).collect();
    assert_eq!(failed, vec!["B 1.0.0", "D 1.0.0"]);

    let mut files: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    files.sort();
    assert_eq!(files, vec!["a.1.0.0.nupkg", "c.1.0.0.nupkg", "e.1.0.0.nupkg"]);
}

#[tokio::test]
async fn test_outcomes_follow_input_order() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = five_packages();
    let registry = registry_with(&packages, &[]);

    let summary = download_all(
        registry,
        &packages,
        tmp.path(),
        4,
        &CancellationToken::new(),
        &hidden(),
    )
    .await
    .unwrap();
    let order: Vec<_> = summary.items.iter().map(|i| i.package.clone()).collect();
    assert_eq!(order, packages);
    assert_eq!(summary.downloaded(), 5);
}

#[tokio::test]
async fn test_second_run_reports_already_present() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = five_packages();
    let registry = registry_with(&packages, &[]);
    let token = CancellationToken::new();

    let first = download_all(registry.clone(), &packages, tmp.path(), 4, &token, &hidden())
        .await
        .unwrap();
    let second = download_all(registry, &packages, tmp.path(), 4, &token, &hidden())
        .await
        .unwrap();

    assert_eq!(second.already_present(), 5);
    assert_eq!(second.failed, 0);
    for (a, b) in first.items.iter().zip(&second.items) {
        match (&a.outcome, &b.outcome) {
            (
                DownloadOutcome::Downloaded { sha512: first, .. },
                DownloadOutcome::AlreadyPresent { sha512: second },
            ) => {
                assert_eq!(first, second);
                assert_eq!(*first, sha512_bytes(&InMemoryRegistry::artifact_bytes(&a.package)));
            }
            other => panic!("unexpected outcomes {other:?}"),
        }
    }
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 5);
}

#[tokio::test]
async fn test_cancelled_run_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = five_packages();
    let registry = registry_with(&packages, &[]);
    let token = CancellationToken::new();
    token.cancel();

    let summary = download_all(registry, &packages, tmp.path(), 2, &token, &hidden())
        .await
        .unwrap();

    assert_eq!(summary.failed, 5);
    assert!(summary.failures().all(|(_, reason)| reason == CANCELLED_REASON));
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_cancel_during_download_keeps_finished_files_only() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = vec![identity("Fast", "1.0.0"), identity("Slow", "1.0.0")];
    let mut registry = InMemoryRegistry::new();
    for p in &packages {
        registry.add_package(p.clone(), vec![]);
    }
    registry.stall_artifact(identity("Slow", "1.0.0"));
    let registry: Arc<dyn PackageRegistry> = Arc::new(registry);

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let summary = download_all(registry, &packages, tmp.path(), 2, &token, &hidden())
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 1);
    let failures: Vec<_> = summary.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, &identity("Slow", "1.0.0"));
    assert_eq!(failures[0].1, CANCELLED_REASON);

    let mut names: Vec<_> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["fast.1.0.0.nupkg"]);
}

#[tokio::test]
async fn test_creates_missing_output_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("nested").join("OfflinePackages");
    let packages = vec![identity("Solo", "2.0.0")];
    let registry = registry_with(&packages, &[]);

    let token = CancellationToken::new();
    let summary = download_all(registry, &packages, &dest, 1, &token, &hidden())
        .await
        .unwrap();
    assert_eq!(summary.succeeded, 1);
    assert!(dest.join("solo.2.0.0.nupkg").is_file());
}

#[tokio::test]
async fn test_output_dir_that_is_a_file_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let dest = tmp.path().join("occupied");
    std::fs::write(&dest, b"not a directory").unwrap();
    let packages = vec![identity("Solo", "2.0.0")];
    let registry = registry_with(&packages, &[]);

    let token = CancellationToken::new();
    let result = download_all(registry, &packages, &dest.join("sub"), 1, &token, &hidden()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_summary_json_shape() {
    let tmp = tempfile::tempdir().unwrap();
    let packages = vec![identity("Ok", "1.0.0"), identity("Bad", "1.0.0")];
    let registry = registry_with(&packages, &["Bad"]);

    let token = CancellationToken::new();
    let summary = download_all(registry, &packages, tmp.path(), 2, &token, &hidden())
        .await
        .unwrap();
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["items"][0]["status"], "downloaded");
    assert_eq!(json["items"][0]["file"], "ok.1.0.0.nupkg");
    assert_eq!(json["items"][0]["sha512"].as_str().unwrap().len(), 128);
    assert_eq!(json["items"][1]["status"], "failed");
}
