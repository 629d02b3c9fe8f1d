//! Content digests.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors produced when validating a digest string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The hex portion is not exactly 64 characters long.
    #[error("Invalid SHA256 digest: expected 64 hex characters, got {len} in '{input}'")]
    Length {
        /// Length of the hex portion that was supplied.
        len: usize,
        /// The rejected input.
        input: String,
    },

    /// The hex portion contains characters outside `[0-9a-fA-F]`.
    #[error("Invalid SHA256 digest: contains non-hex characters in '{0}'")]
    NonHex(String),
}

/// A validated SHA256 digest (64 hex characters)
///
/// Digests are validated at deserialization time and stored lowercase, so
/// an invalid checksum in a manifest is rejected when the manifest loads
/// rather than when an artifact is compared against it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sha256Digest(String);

impl Sha256Digest {
    /// Create a new `Sha256Digest`, validating the input.
    ///
    /// Accepts strings with or without a `sha256:` prefix, in either case.
    ///
    /// # Errors
    ///
    /// Returns an error if the hex portion is not exactly 64 ASCII hex characters.
    pub fn new(s: impl Into<String>) -> Result<Self, DigestError> {
        let s = s.into();
        let hex = s.strip_prefix("sha256:").unwrap_or(&s);

        if hex.len() != 64 {
            return Err(DigestError::Length {
                len: hex.len(),
                input: s.clone(),
            });
        }

        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DigestError::NonHex(s.clone()));
        }

        Ok(Self(hex.to_lowercase()))
    }

    /// Get the digest as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a hex string.
    pub fn matches(&self, other_hex: &str) -> bool {
        self.0.eq_ignore_ascii_case(other_hex.trim())
    }
}

impl<'de> Deserialize<'de> for Sha256Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Sha256Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Sha256Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Sha256Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIGEST: &str = "9b97142b7fa207cbb68e5a1926d9dafbd1375e06a5f2336b197f3fdb774a2626";

    #[test]
    fn digest_is_normalized_to_lowercase() {
        let d = Sha256Digest::new(DIGEST.to_uppercase()).unwrap();
        assert_eq!(d.as_str(), DIGEST);
    }

    #[test]
    fn digest_accepts_prefix() {
        let d = Sha256Digest::new(format!("sha256:{DIGEST}")).unwrap();
        assert_eq!(d.as_str(), DIGEST);
    }

    #[test]
    fn digest_rejects_bad_input() {
        assert!(matches!(
            Sha256Digest::new("abc123"),
            Err(DigestError::Length { len: 6, .. })
        ));
        let bad = format!("{}zz", &DIGEST[..62]);
        assert!(matches!(Sha256Digest::new(bad), Err(DigestError::NonHex(_))));
    }

    #[test]
    fn matches_ignores_case() {
        let d = Sha256Digest::new(DIGEST).unwrap();
        assert!(d.matches(&DIGEST.to_uppercase()));
        assert!(!d.matches(&DIGEST[1..]));
    }
}
