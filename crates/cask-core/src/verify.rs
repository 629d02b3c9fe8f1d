//! Artifact integrity verification.
//!
//! Every artifact is hashed with SHA-256 over its full byte stream and
//! compared (case-insensitively) against the digest declared by the cask.
//! Installation is gated on a passing result; there is no bypass.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::io::AsyncReadExt;

use crate::types::Sha256Digest;

const BUF_SIZE: usize = 64 * 1024;

/// Verification failures.
#[derive(Error, Debug)]
pub enum IntegrityError {
    /// The artifact contained zero bytes.
    #[error("Artifact is empty")]
    EmptyArtifact,

    /// Computed digest differs from the expected one.
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Digest declared by the cask.
        expected: String,
        /// Digest computed over the artifact.
        actual: String,
    },

    /// The artifact could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn digest_of(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

fn compare(len: u64, actual: String, expected_hex: &str) -> Result<String, IntegrityError> {
    if len == 0 {
        return Err(IntegrityError::EmptyArtifact);
    }
    if !actual.eq_ignore_ascii_case(expected_hex.trim()) {
        return Err(IntegrityError::ChecksumMismatch {
            expected: expected_hex.trim().to_lowercase(),
            actual,
        });
    }
    Ok(actual)
}

/// Verify an in-memory artifact against an expected hex digest.
///
/// # Errors
///
/// `EmptyArtifact` for zero-length input, `ChecksumMismatch` otherwise when
/// the digests differ.
pub fn verify(bytes: &[u8], expected_hex: &str) -> Result<(), IntegrityError> {
    compare(bytes.len() as u64, digest_of(bytes), expected_hex).map(|_| ())
}

/// Stream a file through SHA-256 and compare it against `expected`.
///
/// Returns the computed digest on success.
///
/// # Errors
///
/// Same as [`verify`], plus `Io` if the file cannot be read.
pub async fn verify_file(path: &Path, expected: &Sha256Digest) -> Result<String, IntegrityError> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    let mut len = 0u64;

    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        len += n as u64;
    }

    compare(len, hex::encode(hasher.finalize()), expected.as_str())
}

/// Blocking SHA-256 of a file, for callers outside the runtime.
///
/// # Errors
///
/// Returns any I/O error raised while reading the file.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HELLO_SHA: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[test]
    fn verify_accepts_own_digest() {
        for bytes in [&b"hello"[..], b"x", &[0u8; 4096]] {
            assert!(verify(bytes, &digest_of(bytes)).is_ok());
        }
    }

    #[test]
    fn verify_is_case_insensitive() {
        assert!(verify(b"hello", &HELLO_SHA.to_uppercase()).is_ok());
    }

    #[test]
    fn verify_rejects_other_digest() {
        let err = verify(b"hello", &digest_of(b"world")).unwrap_err();
        match err {
            IntegrityError::ChecksumMismatch { expected, actual } => {
                assert_eq!(expected, digest_of(b"world"));
                assert_eq!(actual, HELLO_SHA);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn verify_rejects_empty_input() {
        assert!(matches!(
            verify(b"", &digest_of(b"")),
            Err(IntegrityError::EmptyArtifact)
        ));
    }

    #[tokio::test]
    async fn verify_file_streams_large_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifact.pkg");
        let data = vec![7u8; BUF_SIZE * 3 + 17];
        std::fs::File::create(&path).unwrap().write_all(&data).unwrap();

        let expected = Sha256Digest::new(digest_of(&data)).unwrap();
        let actual = verify_file(&path, &expected).await.unwrap();
        assert_eq!(actual, expected.as_str());
        assert_eq!(sha256_file(&path).unwrap(), actual);
    }

    #[tokio::test]
    async fn verify_file_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pkg");
        std::fs::write(&path, b"").unwrap();

        let expected = Sha256Digest::new(HELLO_SHA).unwrap();
        assert!(matches!(
            verify_file(&path, &expected).await,
            Err(IntegrityError::EmptyArtifact)
        ));
    }
}
