//! NuGet version parsing, comparison, and range matching.
//!
//! NuGet versions extend SemVer 2.0 with an optional fourth numeric part:
//! - `major.minor[.patch[.revision]]`, missing parts are zero
//! - an optional `-prerelease` label made of dot-separated segments
//! - optional `+metadata`, which never takes part in comparison
//! - a release sorts after every pre-release of the same numbers

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CoreError;

/// A parsed NuGet package version.
#[derive(Debug, Clone)]
pub struct NuGetVersion {
    original: String,
    parts: [u64; 4],
    release_labels: Vec<String>,
    metadata: Option<String>,
}

impl NuGetVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            original: format!("{major}.{minor}.{patch}"),
            parts: [major, minor, patch, 0],
            release_labels: Vec::new(),
            metadata: None,
        }
    }

    pub fn parse(input: &str) -> Result<Self, CoreError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(CoreError::version(input, "empty version"));
        }

        let (rest, metadata) = match s.split_once('+') {
            Some((_, "")) => return Err(CoreError::version(input, "empty build metadata")),
            Some((rest, meta)) => (rest, Some(meta.to_string())),
            None => (s, None),
        };

        let (numbers, label) = match rest.split_once('-') {
            Some((_, "")) => return Err(CoreError::version(input, "empty pre-release label")),
            Some((numbers, label)) => (numbers, Some(label)),
            None => (rest, None),
        };

        let mut parts = [0u64; 4];
        let mut count = 0;
        for piece in numbers.split('.') {
            if count == 4 {
                return Err(CoreError::version(input, "more than four numeric parts"));
            }
            if piece.is_empty() || !piece.bytes().all(|b| b.is_ascii_digit()) {
                return Err(CoreError::version(
                    input,
                    format!("'{piece}' is not a number"),
                ));
            }
            parts[count] = piece
                .parse()
                .map_err(|_| CoreError::version(input, format!("'{piece}' is out of range")))?;
            count += 1;
        }

        let mut release_labels = Vec::new();
        if let Some(label) = label {
            for segment in label.split('.') {
                if segment.is_empty() {
                    return Err(CoreError::version(input, "empty pre-release segment"));
                }
                if !segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
                {
                    return Err(CoreError::version(
                        input,
                        format!("invalid character in pre-release segment '{segment}'"),
                    ));
                }
                release_labels.push(segment.to_string());
            }
        }

        Ok(Self {
            original: s.to_string(),
            parts,
            release_labels,
            metadata,
        })
    }

    pub fn major(&self) -> u64 {
        self.parts[0]
    }

    pub fn minor(&self) -> u64 {
        self.parts[1]
    }

    pub fn patch(&self) -> u64 {
        self.parts[2]
    }

    pub fn revision(&self) -> u64 {
        self.parts[3]
    }

    pub fn is_prerelease(&self) -> bool {
        !self.release_labels.is_empty()
    }

    /// The pre-release label without its leading `-`, if any.
    pub fn release_label(&self) -> Option<String> {
        self.is_prerelease().then(|| self.release_labels.join("."))
    }

    pub fn metadata(&self) -> Option<&str> {
        self.metadata.as_deref()
    }

    /// The text this version was parsed from.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Canonical text: three parts (four when the revision is non-zero),
    /// the pre-release label, no metadata.
    ///
    /// `1.0` becomes `1.0.0`, `1.2.3.0+sha` becomes `1.2.3`.
    pub fn to_normalized_string(&self) -> String {
        let [major, minor, patch, revision] = self.parts;
        let mut out = format!("{major}.{minor}.{patch}");
        if revision > 0 {
            out.push_str(&format!(".{revision}"));
        }
        if let Some(label) = self.release_label() {
            out.push('-');
            out.push_str(&label);
        }
        out
    }
}

impl fmt::Display for NuGetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_normalized_string())
    }
}

impl FromStr for NuGetVersion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for NuGetVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl PartialEq for NuGetVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NuGetVersion {}

impl Hash for NuGetVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parts.hash(state);
        self.release_labels.len().hash(state);
        for label in &self.release_labels {
            // must agree with compare_segment: `01` == `1`, `Beta` == `beta`
            if label.bytes().all(|c| c.is_ascii_digit()) {
                label.trim_start_matches('0').hash(state);
            } else {
                label.to_ascii_lowercase().hash(state);
            }
        }
    }
}

impl Ord for NuGetVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts
            .cmp(&other.parts)
            .then_with(|| compare_labels(&self.release_labels, &other.release_labels))
    }
}

impl PartialOrd for NuGetVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_labels(a: &[String], b: &[String]) -> Ordering {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    for (x, y) in a.iter().zip(b) {
        let ord = compare_segment(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let a_numeric = a.bytes().all(|c| c.is_ascii_digit());
    let b_numeric = b.bytes().all(|c| c.is_ascii_digit());
    match (a_numeric, b_numeric) {
        // Compare digit strings by magnitude without parsing, so huge
        // segments cannot overflow.
        (true, true) => {
            let a = a.trim_start_matches('0');
            let b = b.trim_start_matches('0');
            a.len().cmp(&b.len()).then_with(|| a.cmp(b))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase()),
    }
}

/// Pick the version a request without an explicit version should get:
/// the highest stable version, or the highest pre-release when nothing
/// stable has been published.
pub fn latest_version(versions: &[NuGetVersion]) -> Option<&NuGetVersion> {
    versions
        .iter()
        .filter(|v| !v.is_prerelease())
        .max()
        .or_else(|| versions.iter().max())
}

/// One end of a [`VersionRange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: NuGetVersion,
    pub inclusive: bool,
}

/// A NuGet version range in interval notation.
///
/// Supports: `1.0` (at least 1.0), `[1.0]` (exact), `[1.0,2.0)`, `(1.0,)`,
/// `(,2.0]`, and the empty string or `(,)` for any version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}

impl VersionRange {
    /// A range every version satisfies.
    pub fn any() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// `[version, )`: the bare-version form.
    pub fn at_least(version: NuGetVersion) -> Self {
        Self {
            lower: Some(Bound {
                version,
                inclusive: true,
            }),
            upper: None,
        }
    }

    pub fn parse(spec: &str) -> Result<Self, CoreError> {
        let s = spec.trim();
        if s.is_empty() {
            return Ok(Self::any());
        }

        if !s.starts_with('[') && !s.starts_with('(') {
            let version =
                NuGetVersion::parse(s).map_err(|_| CoreError::range(spec, "not a version"))?;
            return Ok(Self::at_least(version));
        }

        if s.len() < 2 || !(s.ends_with(']') || s.ends_with(')')) {
            return Err(CoreError::range(spec, "missing closing bracket"));
        }

        let open_inclusive = s.starts_with('[');
        let close_inclusive = s.ends_with(']');
        let inner = &s[1..s.len() - 1];

        let bound = |text: &str, inclusive: bool| -> Result<Option<Bound>, CoreError> {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            let version = NuGetVersion::parse(text)
                .map_err(|_| CoreError::range(spec, format!("'{text}' is not a version")))?;
            Ok(Some(Bound { version, inclusive }))
        };

        let range = match inner.split_once(',') {
            Some((lower, upper)) => {
                if upper.contains(',') {
                    return Err(CoreError::range(spec, "too many commas"));
                }
                Self {
                    lower: bound(lower, open_inclusive)?,
                    upper: bound(upper, close_inclusive)?,
                }
            }
            None => {
                // Exact version: [1.0] means exactly 1.0
                if !(open_inclusive && close_inclusive) {
                    return Err(CoreError::range(spec, "exact versions must use [ ]"));
                }
                let exact = bound(inner, true)?
                    .ok_or_else(|| CoreError::range(spec, "empty exact version"))?;
                Self {
                    lower: Some(exact.clone()),
                    upper: Some(exact),
                }
            }
        };

        if let (Some(lower), Some(upper)) = (&range.lower, &range.upper) {
            match lower.version.cmp(&upper.version) {
                Ordering::Greater => {
                    return Err(CoreError::range(spec, "lower bound exceeds upper bound"))
                }
                Ordering::Equal if !(lower.inclusive && upper.inclusive) => {
                    return Err(CoreError::range(spec, "range is empty"))
                }
                _ => {}
            }
        }

        Ok(range)
    }

    /// Check if a version satisfies this range.
    pub fn contains(&self, version: &NuGetVersion) -> bool {
        if let Some(ref lower) = self.lower {
            let cmp = version.cmp(&lower.version);
            if lower.inclusive {
                if cmp == Ordering::Less {
                    return false;
                }
            } else if cmp != Ordering::Greater {
                return false;
            }
        }
        if let Some(ref upper) = self.upper {
            let cmp = version.cmp(&upper.version);
            if upper.inclusive {
                if cmp == Ordering::Greater {
                    return false;
                }
            } else if cmp != Ordering::Less {
                return false;
            }
        }
        true
    }

    /// The inclusive lower bound, which the minimum-version policy installs.
    ///
    /// `None` when the range is unbounded below or its lower bound is
    /// exclusive; the floor is then not itself an acceptable version.
    pub fn floor(&self) -> Option<&NuGetVersion> {
        self.lower
            .as_ref()
            .filter(|b| b.inclusive)
            .map(|b| &b.version)
    }

    /// The lowest of `versions` this range accepts, preferring stable
    /// versions over pre-releases.
    pub fn lowest_match<'a>(&self, versions: &'a [NuGetVersion]) -> Option<&'a NuGetVersion> {
        let matching = || versions.iter().filter(|v| self.contains(v));
        matching()
            .filter(|v| !v.is_prerelease())
            .min()
            .or_else(|| matching().min())
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(lower), Some(upper)) = (&self.lower, &self.upper) {
            if lower.version == upper.version {
                return write!(f, "[{}]", lower.version);
            }
        }
        let open = match &self.lower {
            Some(b) if b.inclusive => '[',
            _ => '(',
        };
        let close = match &self.upper {
            Some(b) if b.inclusive => ']',
            _ => ')',
        };
        let lower = self
            .lower
            .as_ref()
            .map(|b| b.version.to_string())
            .unwrap_or_default();
        let upper = self
            .upper
            .as_ref()
            .map(|b| b.version.to_string())
            .unwrap_or_default();
        write!(f, "{open}{lower}, {upper}{close}")
    }
}

impl FromStr for VersionRange {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for VersionRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
