use nupull_core::identity::PackageIdentity;
use nupull_core::resolved::ResolvedSet;
use nupull_core::version::NuGetVersion;

fn identity(id: &str, version: &str) -> PackageIdentity {
    PackageIdentity::new(id, NuGetVersion::parse(version).unwrap())
}

#[test]
fn test_insert_rejects_equal_identity() {
    let mut set = ResolvedSet::new();
    assert!(set.insert(identity("A", "1.0.0")));
    assert!(!set.insert(identity("a", "1.0")));
    assert!(set.insert(identity("A", "2.0.0")));
    assert_eq!(set.len(), 2);
}

#[test]
fn test_preserves_arrival_order() {
    let mut set = ResolvedSet::new();
    for (id, v) in [("Root", "1.0"), ("Zeta", "1.0"), ("Alpha", "1.0")] {
        set.insert(identity(id, v));
    }
    let names: Vec<_> = set.iter().map(|i| i.id.as_str().to_string()).collect();
    assert_eq!(names, vec!["Root", "Zeta", "Alpha"]);
}

#[test]
fn test_contains_and_empty() {
    let mut set = ResolvedSet::new();
    assert!(set.is_empty());
    set.insert(identity("Dapper", "2.1.0"));
    assert!(set.contains(&identity("DAPPER", "2.1")));
    assert!(!set.contains(&identity("Dapper", "2.1.1")));
}
