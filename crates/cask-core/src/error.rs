//! Error taxonomy for the lifecycle engine.
//!
//! Selection and verification errors abort the current operation.
//! Uninstall and zap collect per-target failures and report them together.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::lifecycle::LifecycleState;
use crate::types::{MacOsRequirement, MacOsVersion};
use crate::verify::IntegrityError;

/// A single target (identifier or path) that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// The pkgutil identifier or filesystem path.
    pub target: String,
    /// Human-readable reason reported by the collaborator.
    pub reason: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.target, self.reason)
    }
}

fn join_failures(failures: &[Failure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while fetching an artifact or a release listing.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Transport-level failure (DNS, TLS, connection reset).
    #[error("HTTP error fetching {url}: {message}")]
    Http {
        /// The URL being fetched.
        url: String,
        /// Underlying error message.
        message: String,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// The URL being fetched.
        url: String,
        /// Response status code.
        status: u16,
    },

    /// The request did not complete within the configured timeout.
    #[error("Timed out fetching {url}")]
    Timeout {
        /// The URL being fetched.
        url: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed response from {url}: {message}")]
    Decode {
        /// The URL being fetched.
        url: String,
        /// Decoder error message.
        message: String,
    },

    /// No release source knows how to list this URL.
    #[error("Unsupported release source: {0}")]
    UnsupportedSource(String),

    /// Local I/O error while writing the artifact.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the lifecycle executor.
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// The host architecture tag has no variant in the manifest.
    #[error("Unsupported architecture '{requested}' (supported: {})", .supported.join(", "))]
    UnsupportedArchitecture {
        /// The tag the host reported.
        requested: String,
        /// Tags the manifest declares, sorted.
        supported: Vec<String>,
    },

    /// The host macOS version does not satisfy `depends_on.macos`.
    #[error("Requires macOS {required}, host is {host}")]
    UnsupportedOs {
        /// The manifest requirement.
        required: MacOsRequirement,
        /// The detected host version.
        host: MacOsVersion,
    },

    /// The artifact contained zero bytes.
    #[error("Artifact is empty")]
    EmptyArtifact,

    /// The artifact digest differs from the manifest.
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Digest declared by the manifest.
        expected: String,
        /// Digest computed over the artifact.
        actual: String,
    },

    /// `install` was called for an artifact this executor has not verified.
    #[error("Refusing to install unverified artifact {}", .path.display())]
    UnverifiedArtifact {
        /// The artifact path passed to `install`.
        path: PathBuf,
    },

    /// The OS installer exited unsuccessfully.
    #[error("Installer failed with exit code {exit_code}")]
    InstallerFailed {
        /// Native exit code (`-1` when terminated by a signal).
        exit_code: i32,
    },

    /// One or more package identifiers could not be unregistered.
    #[error("Uninstall incomplete; failed: {}", join_failures(.failed))]
    PartialUninstallFailure {
        /// Identifiers that failed, in manifest order.
        failed: Vec<Failure>,
        /// Identifiers that were removed.
        removed: Vec<String>,
    },

    /// One or more zap paths could not be removed.
    #[error("Zap incomplete; failed: {}", join_failures(.failed))]
    PartialZapFailure {
        /// Paths that failed, in manifest order.
        failed: Vec<Failure>,
        /// Paths that were removed.
        removed: Vec<String>,
    },

    /// Downloading the artifact failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The download was cancelled before verification began.
    #[error("Download cancelled")]
    Cancelled,

    /// A cancellation request arrived after the point of no return.
    #[error("Cannot cancel while {state}")]
    NotCancellable {
        /// State the executor was in when cancellation was requested.
        state: LifecycleState,
    },

    /// The requested operation is not valid from the current state.
    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: LifecycleState,
        /// Requested state.
        to: LifecycleState,
    },

    /// The install-state store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Local I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IntegrityError> for LifecycleError {
    fn from(err: IntegrityError) -> Self {
        match err {
            IntegrityError::EmptyArtifact => Self::EmptyArtifact,
            IntegrityError::ChecksumMismatch { expected, actual } => {
                Self::ChecksumMismatch { expected, actual }
            }
            IntegrityError::Io(e) => Self::Io(e),
        }
    }
}

/// Errors produced while checking for updates.
#[derive(Error, Debug)]
pub enum LivecheckError {
    /// The release listing could not be retrieved.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The listing contained no non-draft release matching the strategy.
    #[error("No matching releases found at {url}")]
    NoMatchingReleases {
        /// The listing URL that was queried.
        url: String,
    },

    /// The manifest has no `[livecheck]` section.
    #[error("Cask '{0}' has no livecheck configuration")]
    NotConfigured(String),

    /// The strategy name or pattern is invalid.
    #[error("Invalid livecheck strategy: {0}")]
    InvalidStrategy(String),
}

/// Failure reported by an [`InstallStore`](crate::host::InstallStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("State store error: {0}")]
pub struct StoreError(pub String);

impl StoreError {
    /// Wrap any displayable error.
    pub fn new(msg: impl fmt::Display) -> Self {
        Self(msg.to_string())
    }
}
