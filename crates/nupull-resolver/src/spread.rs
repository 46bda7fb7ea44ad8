//! Packages that ended up in a resolution at more than one version.
//!
//! The minimum-version policy never unifies versions, so two edges asking
//! for different floors of the same id both land in the set. This report
//! makes that visible without changing the result.

use std::fmt;

use nupull_core::identity::PackageId;
use nupull_core::resolved::ResolvedSet;
use nupull_core::version::NuGetVersion;
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
pub struct SpreadReport {
    pub entries: Vec<VersionSpread>,
}

/// One id present at several versions, lowest first.
#[derive(Debug, Clone, Serialize)]
pub struct VersionSpread {
    pub id: PackageId,
    pub versions: Vec<NuGetVersion>,
}

impl SpreadReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the report for a resolved set, in first-arrival order of ids.
    pub fn from_resolved(set: &ResolvedSet) -> Self {
        let mut entries: Vec<VersionSpread> = Vec::new();
        for identity in set {
            match entries.iter_mut().find(|e| e.id == identity.id) {
                Some(entry) => entry.versions.push(identity.version.clone()),
                None => entries.push(VersionSpread {
                    id: identity.id.clone(),
                    versions: vec![identity.version.clone()],
                }),
            }
        }
        entries.retain(|e| e.versions.len() > 1);
        for entry in &mut entries {
            entry.versions.sort();
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Display for SpreadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "Every package resolved to a single version.");
        }
        writeln!(f, "Packages at multiple versions ({}):", self.entries.len())?;
        for entry in &self.entries {
            writeln!(f, "  {entry}")?;
        }
        Ok(())
    }
}

impl fmt::Display for VersionSpread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let versions: Vec<String> = self.versions.iter().map(|v| v.to_string()).collect();
        write!(f, "{}: {}", self.id, versions.join(", "))
    }
}
