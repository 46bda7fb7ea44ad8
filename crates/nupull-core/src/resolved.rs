//! The flattened, deduplicated output of a resolution run.

use std::collections::HashSet;

use serde::{Serialize, Serializer};

use crate::identity::PackageIdentity;

/// A set of package identities in first-arrival order.
///
/// Only grows: there is no removal, so every identity recorded during a run
/// is still present when the set is handed to the download stage.
#[derive(Debug, Clone, Default)]
pub struct ResolvedSet {
    order: Vec<PackageIdentity>,
    seen: HashSet<PackageIdentity>,
}

impl ResolvedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity. Returns `false` when an equal identity (under the
    /// case-insensitive, normalized key) is already present.
    pub fn insert(&mut self, identity: PackageIdentity) -> bool {
        if self.seen.contains(&identity) {
            return false;
        }
        self.seen.insert(identity.clone());
        self.order.push(identity);
        true
    }

    pub fn contains(&self, identity: &PackageIdentity) -> bool {
        self.seen.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PackageIdentity> {
        self.order.iter()
    }

    pub fn as_slice(&self) -> &[PackageIdentity] {
        &self.order
    }

    pub fn into_vec(self) -> Vec<PackageIdentity> {
        self.order
    }
}

impl<'a> IntoIterator for &'a ResolvedSet {
    type Item = &'a PackageIdentity;
    type IntoIter = std::slice::Iter<'a, PackageIdentity>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

impl Serialize for ResolvedSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}
