use std::fmt;

use serde::Serialize;

use crate::identity::PackageId;
use crate::version::VersionRange;

/// A dependency declared by a package for one target framework.
///
/// The dependent package is implicit: edges are consumed while its node is
/// being expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    pub id: PackageId,
    pub range: VersionRange,
}

impl DependencyEdge {
    pub fn new(id: impl Into<PackageId>, range: VersionRange) -> Self {
        Self {
            id: id.into(),
            range,
        }
    }
}

impl fmt::Display for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.range)
    }
}
