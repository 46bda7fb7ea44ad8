//! Case-insensitive package ids and `(id, version)` identities.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};

use crate::error::CoreError;
use crate::version::NuGetVersion;

/// A package id. Keeps its original spelling for display; compares, hashes
/// and names files by its ASCII-lowercase form.
#[derive(Debug, Clone)]
pub struct PackageId(String);

impl PackageId {
    /// Validate a user-supplied id.
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let id = input.trim();
        let invalid = |reason: &str| CoreError::InvalidPackageId {
            input: input.to_string(),
            reason: reason.to_string(),
        };
        if id.is_empty() {
            return Err(invalid("empty package id"));
        }
        if id.len() > 100 {
            return Err(invalid("longer than 100 characters"));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        {
            return Err(invalid("unsupported character"));
        }
        if id.starts_with('.') || id.ends_with('.') {
            return Err(invalid("cannot start or end with '.'"));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form used in registry URLs, file names and comparisons.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }
}

/// Ids read back from a registry are taken as published.
impl From<&str> for PackageId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PackageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq for PackageId {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for PackageId {}

impl Hash for PackageId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl Ord for PackageId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .bytes()
            .map(|b| b.to_ascii_lowercase())
            .cmp(other.0.bytes().map(|b| b.to_ascii_lowercase()))
    }
}

impl PartialOrd for PackageId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for PackageId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// A specific package release. This is the dedup key of a resolution run:
/// equality and hashing go through the normalized id and version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageIdentity {
    pub id: PackageId,
    pub version: NuGetVersion,
}

impl PackageIdentity {
    pub fn new(id: impl Into<PackageId>, version: NuGetVersion) -> Self {
        Self {
            id: id.into(),
            version,
        }
    }

    /// Artifact file name: `<id>.<version>.nupkg`, both normalized and
    /// lowercased, so equal identities always map to the same file.
    pub fn file_name(&self) -> String {
        format!(
            "{}.{}.nupkg",
            self.id.to_lowercase(),
            self.version.to_normalized_string().to_ascii_lowercase()
        )
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.version)
    }
}
