//! macOS release names and minimum-OS requirements.
//!
//! Manifests express OS requirements with release names
//! (`">= monterey"`, `">= :sonoma"`) or plain numbers (`">= 12"`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A numeric macOS version (`major.minor`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MacOsVersion {
    /// Major version (e.g. `14` for Sonoma).
    pub major: u32,
    /// Minor version (e.g. `15` for Catalina's `10.15`).
    pub minor: u32,
}

impl MacOsVersion {
    /// Construct a version from its components.
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for MacOsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for MacOsVersion {
    type Err = RequirementError;

    /// Parses `sw_vers -productVersion` output such as `14.5` or `15.0.1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(|| RequirementError::InvalidVersion(s.to_string()))?;
        let minor = match parts.next() {
            Some(p) => p
                .parse()
                .map_err(|_| RequirementError::InvalidVersion(s.to_string()))?,
            None => 0,
        };
        Ok(Self { major, minor })
    }
}

/// Named macOS releases recognised in manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacOsRelease {
    /// macOS 10.15
    Catalina,
    /// macOS 11
    BigSur,
    /// macOS 12
    Monterey,
    /// macOS 13
    Ventura,
    /// macOS 14
    Sonoma,
    /// macOS 15
    Sequoia,
    /// macOS 26
    Tahoe,
}

impl MacOsRelease {
    /// All known releases, oldest first.
    pub const ALL: [Self; 7] = [
        Self::Catalina,
        Self::BigSur,
        Self::Monterey,
        Self::Ventura,
        Self::Sonoma,
        Self::Sequoia,
        Self::Tahoe,
    ];

    /// Manifest spelling of the release name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Catalina => "catalina",
            Self::BigSur => "big_sur",
            Self::Monterey => "monterey",
            Self::Ventura => "ventura",
            Self::Sonoma => "sonoma",
            Self::Sequoia => "sequoia",
            Self::Tahoe => "tahoe",
        }
    }

    /// Numeric version of the release.
    pub fn version(&self) -> MacOsVersion {
        match self {
            Self::Catalina => MacOsVersion::new(10, 15),
            Self::BigSur => MacOsVersion::new(11, 0),
            Self::Monterey => MacOsVersion::new(12, 0),
            Self::Ventura => MacOsVersion::new(13, 0),
            Self::Sonoma => MacOsVersion::new(14, 0),
            Self::Sequoia => MacOsVersion::new(15, 0),
            Self::Tahoe => MacOsVersion::new(26, 0),
        }
    }
}

impl FromStr for MacOsRelease {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches(':').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == name)
            .ok_or_else(|| RequirementError::UnknownRelease(s.to_string()))
    }
}

/// Errors produced while parsing OS requirements.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequirementError {
    /// The release name is not one of [`MacOsRelease::ALL`].
    #[error("Unknown macOS release: {0}")]
    UnknownRelease(String),

    /// A numeric version could not be parsed.
    #[error("Invalid macOS version: {0}")]
    InvalidVersion(String),
}

/// Comparison operator of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// `>=`
    AtLeast,
    /// `>`
    Above,
    /// `<=`
    AtMost,
    /// `<`
    Below,
    /// `==` (or no operator)
    Exactly,
}

impl Comparator {
    fn as_str(self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::Above => ">",
            Self::AtMost => "<=",
            Self::Below => "<",
            Self::Exactly => "==",
        }
    }
}

/// A minimum (or maximum) macOS requirement such as `>= monterey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacOsRequirement {
    /// How the host version is compared.
    pub comparator: Comparator,
    /// The version the host is compared against.
    pub version: MacOsVersion,
}

impl MacOsRequirement {
    /// Returns `true` if `host` satisfies this requirement.
    ///
    /// Exact matches compare the major version only (`monterey` accepts
    /// any 12.x), except for 10.x releases where the minor is the release.
    pub fn is_satisfied_by(&self, host: MacOsVersion) -> bool {
        let ord = if self.version.major == 10 || self.comparator != Comparator::Exactly {
            host.cmp(&self.version)
        } else {
            host.major.cmp(&self.version.major)
        };
        match self.comparator {
            Comparator::AtLeast => ord != Ordering::Less,
            Comparator::Above => ord == Ordering::Greater,
            Comparator::AtMost => ord != Ordering::Greater,
            Comparator::Below => ord == Ordering::Less,
            Comparator::Exactly => ord == Ordering::Equal,
        }
    }
}

impl FromStr for MacOsRequirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (comparator, rest) = [
            (">=", Comparator::AtLeast),
            ("<=", Comparator::AtMost),
            ("==", Comparator::Exactly),
            (">", Comparator::Above),
            ("<", Comparator::Below),
        ]
        .into_iter()
        .find_map(|(op, cmp)| s.strip_prefix(op).map(|rest| (cmp, rest)))
        .unwrap_or((Comparator::Exactly, s));

        let rest = rest.trim();
        let version = if rest.starts_with(|c: char| c.is_ascii_digit()) {
            rest.parse::<MacOsVersion>()?
        } else {
            rest.parse::<MacOsRelease>()?.version()
        };

        Ok(Self {
            comparator,
            version,
        })
    }
}

impl fmt::Display for MacOsRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = MacOsRelease::ALL
            .into_iter()
            .find(|r| r.version() == self.version)
            .map_or_else(|| self.version.to_string(), |r| r.as_str().to_string());
        write!(f, "{} {name}", self.comparator.as_str())
    }
}

impl Serialize for MacOsRequirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacOsRequirement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_requirement_with_symbol_prefix() {
        let req: MacOsRequirement = ">= :monterey".parse().unwrap();
        assert_eq!(req.comparator, Comparator::AtLeast);
        assert_eq!(req.version, MacOsVersion::new(12, 0));
        assert_eq!(req.to_string(), ">= monterey");
    }

    #[test]
    fn parses_numeric_requirement() {
        let req: MacOsRequirement = ">=10.15".parse().unwrap();
        assert_eq!(req.version, MacOsRelease::Catalina.version());
    }

    #[test]
    fn at_least_monterey() {
        let req: MacOsRequirement = ">= monterey".parse().unwrap();
        assert!(req.is_satisfied_by("12.0".parse().unwrap()));
        assert!(req.is_satisfied_by("15.1.1".parse().unwrap()));
        assert!(!req.is_satisfied_by("11.7".parse().unwrap()));
    }

    #[test]
    fn exact_release_accepts_any_point_release() {
        let req: MacOsRequirement = "sonoma".parse().unwrap();
        assert!(req.is_satisfied_by("14.6".parse().unwrap()));
        assert!(!req.is_satisfied_by("15.0".parse().unwrap()));
    }

    #[test]
    fn unknown_release_is_an_error() {
        assert!(matches!(
            ">= cheetah".parse::<MacOsRequirement>(),
            Err(RequirementError::UnknownRelease(_))
        ));
    }

    #[test]
    fn round_trips_through_toml() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            macos: MacOsRequirement,
        }
        let w: Wrapper = toml::from_str(r#"macos = ">= ventura""#).unwrap();
        assert_eq!(w.macos.version, MacOsVersion::new(13, 0));
        assert!(toml::to_string(&w).unwrap().contains(">= ventura"));
    }
}
