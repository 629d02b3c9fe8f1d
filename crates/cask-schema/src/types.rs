//! Identifier newtypes shared between the engine and the CLI.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::cmp::Ordering;

/// A normalized package name (the cask token).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Create a new package name, normalizing the input to lowercase.
    pub fn new(name: &str) -> Self {
        Self(name.to_lowercase())
    }

    /// Return the normalized name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for PackageName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for PackageName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other.to_lowercase()
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.to_lowercase()
    }
}

impl Borrow<str> for PackageName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PackageName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PackageName {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

/// A version string as declared by a manifest or discovered upstream.
///
/// The raw string is kept verbatim (it is substituted into download URLs),
/// but ordering is semantic: `1.0.0-rc.1 < 1.0.0 < 1.0.1 < 1.10.0`.
/// Short forms such as `1.2` are padded to `1.2.0` before comparison, and a
/// leading `v` is ignored. Strings that cannot be read as semver sort below
/// every semver-readable version and compare lexically among themselves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new version from the given string (stored as-is).
    pub fn new(v: &str) -> Self {
        Self(v.to_string())
    }

    /// Return the version string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lenient semver view of this version.
    pub fn semver(&self) -> Option<semver::Version> {
        let s = self.0.trim();
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
        if let Ok(v) = semver::Version::parse(s) {
            return Some(v);
        }

        let (core, rest) = match s.find(['-', '+']) {
            Some(i) => s.split_at(i),
            None => (s, ""),
        };
        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3
            || parts
                .iter()
                .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
        {
            return None;
        }

        let mut padded = parts.join(".");
        for _ in parts.len()..3 {
            padded.push_str(".0");
        }
        semver::Version::parse(&format!("{padded}{rest}")).ok()
    }

    /// Returns `true` if this version carries a pre-release suffix (`-rc.1`).
    pub fn is_prerelease(&self) -> bool {
        self.semver().is_some_and(|v| !v.pre.is_empty())
    }

    /// Compare by semantic precedence alone.
    ///
    /// `1.2` and `1.2.0` are equal, as are versions differing only in build
    /// metadata. Unparseable versions sort below parseable ones and compare
    /// by their raw text among themselves.
    pub fn cmp_semantic(&self, other: &Self) -> Ordering {
        match (self.semver(), other.semver()) {
            (Some(a), Some(b)) => a.cmp_precedence(&b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Tie-break on the raw string so Ord agrees with Eq.
        self.cmp_semantic(other).then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Deref for Version {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Version {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for Version {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Version {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_ties_ignore_padding_and_build_metadata() {
        let short = Version::from("1.2");
        let full = Version::from("1.2.0");
        assert_eq!(short.cmp_semantic(&full), Ordering::Equal);
        assert_eq!(
            Version::from("1.0.0+b1").cmp_semantic(&Version::from("1.0.0+b2")),
            Ordering::Equal
        );
        assert_eq!(
            Version::from("nightly").cmp_semantic(&Version::from("1.0")),
            Ordering::Less
        );
        assert_eq!(
            Version::from("beta").cmp_semantic(&Version::from("alpha")),
            Ordering::Greater
        );
    }

    #[test]
    fn release_outranks_its_release_candidate() {
        assert!(Version::from("1.0.0") > Version::from("1.0.0-rc.1"));
        assert!(Version::from("1.0.0-rc.2") > Version::from("1.0.0-rc.1"));
        assert!(Version::from("1.0.0-rc.1") > Version::from("0.9.9"));
    }

    #[test]
    fn numeric_components_are_not_compared_lexically() {
        assert!(Version::from("1.10.0") > Version::from("1.9.0"));
        assert!(Version::from("0.11.5") > Version::from("0.10.4"));
    }

    #[test]
    fn short_and_prefixed_versions_are_padded() {
        assert_eq!(
            Version::from("v1.2").semver(),
            Some(semver::Version::new(1, 2, 0))
        );
        assert_eq!(
            Version::from("2-beta").semver().map(|v| v.pre.to_string()),
            Some("beta".to_string())
        );
    }

    #[test]
    fn unparsable_versions_sort_below_semver() {
        assert!(Version::from("nightly") < Version::from("0.0.1"));
        assert!(Version::from("1.2.3.4").semver().is_none());
    }

    #[test]
    fn ord_agrees_with_eq() {
        let a = Version::from("v1.0.0");
        let b = Version::from("1.0.0");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn prerelease_detection() {
        assert!(Version::from("1.0.0-rc.1").is_prerelease());
        assert!(!Version::from("1.0.0").is_prerelease());
    }

    #[test]
    fn package_name_is_case_insensitive() {
        assert_eq!(PackageName::new("OpenCloud"), "opencloud");
    }
}
