//! Registration resource documents: per-package index, pages and leaves
//! carrying each version's dependency groups.

use nupull_core::dependency::DependencyEdge;
use nupull_core::framework::TargetFramework;
use nupull_core::version::{NuGetVersion, VersionRange};
use serde::Deserialize;

/// `{registration}/{id}/index.json`
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationIndex {
    #[serde(default)]
    pub items: Vec<RegistrationPage>,
}

/// A page of leaves. Large packages leave `items` out and the page has to be
/// fetched from its `@id`.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationPage {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default)]
    pub lower: Option<String>,
    #[serde(default)]
    pub upper: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<RegistrationLeaf>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationLeaf {
    #[serde(rename = "catalogEntry")]
    pub catalog_entry: CatalogEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    pub version: String,
    #[serde(rename = "dependencyGroups", default)]
    pub dependency_groups: Vec<DependencyGroup>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DependencyGroup {
    #[serde(rename = "targetFramework", default)]
    pub target_framework: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<RegistrationDependency>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationDependency {
    pub id: String,
    #[serde(default)]
    pub range: Option<String>,
}

impl RegistrationPage {
    /// Whether `version` falls within the page's `lower`/`upper` bounds.
    /// Pages with missing or unparsable bounds are always searched.
    pub fn may_contain(&self, version: &NuGetVersion) -> bool {
        let parse = |b: &Option<String>| b.as_deref().and_then(|s| NuGetVersion::parse(s).ok());
        let above_lower = parse(&self.lower).map_or(true, |lower| *version >= lower);
        let below_upper = parse(&self.upper).map_or(true, |upper| *version <= upper);
        above_lower && below_upper
    }
}

/// Find the leaf for `version` among a page's items.
pub fn find_entry<'a>(
    leaves: &'a [RegistrationLeaf],
    version: &NuGetVersion,
) -> Option<&'a CatalogEntry> {
    leaves
        .iter()
        .map(|leaf| &leaf.catalog_entry)
        .find(|entry| NuGetVersion::parse(&entry.version).is_ok_and(|v| v == *version))
}

impl CatalogEntry {
    /// Dependencies declared for the group nearest to `framework`.
    ///
    /// No groups, or no compatible group, means no dependencies. A dependency
    /// whose range does not parse is dropped with a warning; its siblings are
    /// kept.
    pub fn dependencies_for(&self, framework: &TargetFramework) -> Vec<DependencyEdge> {
        let groups: Vec<(TargetFramework, &DependencyGroup)> = self
            .dependency_groups
            .iter()
            .map(|g| {
                let fw = g
                    .target_framework
                    .as_deref()
                    .map(TargetFramework::parse)
                    .unwrap_or_else(TargetFramework::any);
                (fw, g)
            })
            .collect();

        let Some((fw, group)) = framework.nearest(&groups, |(fw, _)| fw) else {
            return Vec::new();
        };
        tracing::debug!("Using dependency group {fw} for {framework}");

        group
            .dependencies
            .iter()
            .filter_map(|dep| {
                match VersionRange::parse(dep.range.as_deref().unwrap_or("")) {
                    Ok(range) => Some(DependencyEdge::new(dep.id.as_str(), range)),
                    Err(e) => {
                        tracing::warn!(
                            "Skipping dependency {} of {}: {e}",
                            dep.id,
                            self.version
                        );
                        None
                    }
                }
            })
            .collect()
    }
}
