//! Target framework monikers and nearest-group selection.
//!
//! A package declares one dependency group per target framework. Given the
//! framework a mirror is built for, [`TargetFramework::nearest`] picks the
//! group NuGet would use: the closest compatible framework, preferring the
//! same family over .NET Standard over the framework-agnostic group.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Framework family, the first half of a moniker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameworkFamily {
    /// Framework-agnostic: `any`, or an empty group moniker.
    Any,
    /// .NET 5+ and .NET Core (`net8.0`, `netcoreapp3.1`).
    Net,
    /// .NET Framework (`net472`).
    NetFramework,
    /// .NET Standard (`netstandard2.0`).
    NetStandard,
    /// A moniker nupull does not model. Only matches itself.
    Other(String),
}

/// A parsed target framework moniker such as `net8.0-windows`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetFramework {
    pub family: FrameworkFamily,
    version: [u32; 4],
    pub platform: Option<String>,
}

impl TargetFramework {
    pub fn any() -> Self {
        Self {
            family: FrameworkFamily::Any,
            version: [0; 4],
            platform: None,
        }
    }

    /// Parse a short (`net472`, `net8.0`) or long (`.NETFramework4.7.2`,
    /// `.NETStandard,Version=v2.0`) moniker. Never fails: unknown monikers
    /// become [`FrameworkFamily::Other`].
    pub fn parse(moniker: &str) -> Self {
        let lower = moniker.trim().to_ascii_lowercase();
        if lower.is_empty() || lower == "any" || lower == "agnostic" {
            return Self::any();
        }
        parse_known(&lower).unwrap_or_else(|| Self {
            family: FrameworkFamily::Other(lower),
            version: [0; 4],
            platform: None,
        })
    }

    pub fn version(&self) -> [u32; 4] {
        self.version
    }

    /// The highest .NET Standard version this framework can consume.
    fn netstandard_ceiling(&self) -> Option<[u32; 4]> {
        let v = self.version;
        match self.family {
            FrameworkFamily::NetStandard => Some(v),
            FrameworkFamily::Net if v >= [3, 0, 0, 0] => Some([2, 1, 0, 0]),
            FrameworkFamily::Net if v >= [2, 0, 0, 0] => Some([2, 0, 0, 0]),
            FrameworkFamily::Net if v >= [1, 0, 0, 0] => Some([1, 6, 0, 0]),
            FrameworkFamily::NetFramework if v >= [4, 6, 1, 0] => Some([2, 0, 0, 0]),
            FrameworkFamily::NetFramework if v >= [4, 6, 0, 0] => Some([1, 3, 0, 0]),
            FrameworkFamily::NetFramework if v >= [4, 5, 1, 0] => Some([1, 2, 0, 0]),
            FrameworkFamily::NetFramework if v >= [4, 5, 0, 0] => Some([1, 1, 0, 0]),
            _ => None,
        }
    }

    /// Whether a package built for `candidate` can be consumed by `self`.
    pub fn is_compatible_with(&self, candidate: &TargetFramework) -> bool {
        if candidate.family == FrameworkFamily::Any {
            return true;
        }
        if candidate.family == self.family {
            if let FrameworkFamily::Other(_) = self.family {
                return candidate == self;
            }
            let platform_ok = match (&candidate.platform, &self.platform) {
                (None, _) => true,
                (Some(c), Some(t)) => c == t,
                (Some(_), None) => false,
            };
            return platform_ok && candidate.version <= self.version;
        }
        if candidate.family == FrameworkFamily::NetStandard {
            return self
                .netstandard_ceiling()
                .is_some_and(|ceiling| candidate.version <= ceiling);
        }
        false
    }

    /// Pick the nearest compatible entry among `groups`.
    ///
    /// Ranking: same family beats .NET Standard beats `any`; within a rank
    /// the highest version wins; at equal version a platform-specific group
    /// beats the platform-neutral one.
    pub fn nearest<'a, T>(
        &self,
        groups: &'a [T],
        framework_of: impl Fn(&T) -> &TargetFramework,
    ) -> Option<&'a T> {
        groups
            .iter()
            .filter(|g| self.is_compatible_with(framework_of(g)))
            .max_by_key(|g| {
                let fw = framework_of(g);
                let rank = if fw.family == self.family {
                    2u8
                } else if fw.family == FrameworkFamily::NetStandard {
                    1
                } else {
                    0
                };
                (rank, fw.version, fw.platform.is_some())
            })
    }
}

fn parse_known(lower: &str) -> Option<TargetFramework> {
    // Long form: `.netstandard2.0`, `.netframework,version=v4.7.2`
    if let Some(rest) = lower.strip_prefix('.') {
        let (name, version) = match rest.split_once(",version=v") {
            Some((name, version)) => (name, version),
            None => {
                let split = rest.find(|c: char| c.is_ascii_digit())?;
                rest.split_at(split)
            }
        };
        let family = match name {
            "netstandard" => FrameworkFamily::NetStandard,
            "netframework" => FrameworkFamily::NetFramework,
            "netcoreapp" => FrameworkFamily::Net,
            _ => return None,
        };
        return Some(TargetFramework {
            family,
            version: parse_dotted(version)?,
            platform: None,
        });
    }

    let (base, platform) = match lower.split_once('-') {
        Some((base, platform)) => {
            // `windows7.0` compares as `windows`
            let name = platform.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
            if name.is_empty() {
                return None;
            }
            (base, Some(name.to_string()))
        }
        None => (lower, None),
    };

    let (family, version) = if let Some(v) = base.strip_prefix("netstandard") {
        (FrameworkFamily::NetStandard, parse_version(v)?)
    } else if let Some(v) = base.strip_prefix("netcoreapp") {
        (FrameworkFamily::Net, parse_version(v)?)
    } else if let Some(v) = base.strip_prefix("net") {
        let version = parse_version(v)?;
        let family = if version[0] >= 5 {
            FrameworkFamily::Net
        } else {
            FrameworkFamily::NetFramework
        };
        (family, version)
    } else {
        return None;
    };

    Some(TargetFramework {
        family,
        version,
        platform,
    })
}

/// `8.0` is dotted; `472` is one digit per part.
fn parse_version(text: &str) -> Option<[u32; 4]> {
    if text.contains('.') {
        parse_dotted(text)
    } else {
        parse_compact(text)
    }
}

fn parse_dotted(text: &str) -> Option<[u32; 4]> {
    let mut out = [0u32; 4];
    for (i, piece) in text.split('.').enumerate() {
        if i == 4 {
            return None;
        }
        out[i] = piece.parse().ok()?;
    }
    Some(out)
}

fn parse_compact(text: &str) -> Option<[u32; 4]> {
    if text.is_empty() || text.len() > 4 {
        return None;
    }
    let mut out = [0u32; 4];
    for (i, c) in text.chars().enumerate() {
        out[i] = c.to_digit(10)?;
    }
    Some(out)
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, minor, patch, _] = self.version;
        match &self.family {
            FrameworkFamily::Any => return f.write_str("any"),
            FrameworkFamily::Other(name) => return f.write_str(name),
            FrameworkFamily::Net if major >= 5 => write!(f, "net{major}.{minor}")?,
            FrameworkFamily::Net => write!(f, "netcoreapp{major}.{minor}")?,
            FrameworkFamily::NetStandard => write!(f, "netstandard{major}.{minor}")?,
            FrameworkFamily::NetFramework => {
                write!(f, "net{major}{minor}")?;
                if patch > 0 {
                    write!(f, "{patch}")?;
                }
            }
        }
        if let Some(platform) = &self.platform {
            write!(f, "-{platform}")?;
        }
        Ok(())
    }
}

impl FromStr for TargetFramework {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl Serialize for TargetFramework {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_monikers() {
        let net10 = TargetFramework::parse("net10.0");
        assert_eq!(net10.family, FrameworkFamily::Net);
        assert_eq!(net10.version(), [10, 0, 0, 0]);

        let net472 = TargetFramework::parse("net472");
        assert_eq!(net472.family, FrameworkFamily::NetFramework);
        assert_eq!(net472.version(), [4, 7, 2, 0]);

        let core = TargetFramework::parse("netcoreapp3.1");
        assert_eq!(core.family, FrameworkFamily::Net);
        assert_eq!(core.version(), [3, 1, 0, 0]);
    }

    #[test]
    fn parse_long_monikers() {
        assert_eq!(
            TargetFramework::parse(".NETStandard2.0"),
            TargetFramework::parse("netstandard2.0")
        );
        assert_eq!(
            TargetFramework::parse(".NETFramework4.7.2"),
            TargetFramework::parse("net472")
        );
        assert_eq!(
            TargetFramework::parse(".NETStandard,Version=v2.1"),
            TargetFramework::parse("netstandard2.1")
        );
    }

    #[test]
    fn parse_platform_suffix() {
        let fw = TargetFramework::parse("net8.0-windows7.0");
        assert_eq!(fw.family, FrameworkFamily::Net);
        assert_eq!(fw.platform.as_deref(), Some("windows"));
        assert_eq!(fw.to_string(), "net8.0-windows");
    }

    #[test]
    fn parse_any_and_unknown() {
        assert_eq!(TargetFramework::parse(""), TargetFramework::any());
        assert_eq!(TargetFramework::parse("Any"), TargetFramework::any());
        assert_eq!(
            TargetFramework::parse("uap10.0").family,
            FrameworkFamily::Other("uap10.0".to_string())
        );
    }

    #[test]
    fn display_round_trips_short_form() {
        for moniker in ["net10.0", "net472", "net48", "netstandard2.0", "netcoreapp3.1"] {
            assert_eq!(TargetFramework::parse(moniker).to_string(), moniker);
        }
    }

    #[test]
    fn compatibility_rules() {
        let net8 = TargetFramework::parse("net8.0");
        assert!(net8.is_compatible_with(&TargetFramework::parse("net6.0")));
        assert!(net8.is_compatible_with(&TargetFramework::parse("netcoreapp3.1")));
        assert!(net8.is_compatible_with(&TargetFramework::parse("netstandard2.1")));
        assert!(net8.is_compatible_with(&TargetFramework::any()));
        assert!(!net8.is_compatible_with(&TargetFramework::parse("net9.0")));
        assert!(!net8.is_compatible_with(&TargetFramework::parse("net472")));
        assert!(!net8.is_compatible_with(&TargetFramework::parse("net8.0-windows")));

        let net462 = TargetFramework::parse("net462");
        assert!(net462.is_compatible_with(&TargetFramework::parse("netstandard2.0")));
        assert!(!net462.is_compatible_with(&TargetFramework::parse("netstandard2.1")));
        assert!(net462.is_compatible_with(&TargetFramework::parse("net45")));
    }
}
