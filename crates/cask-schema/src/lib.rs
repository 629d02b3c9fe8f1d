//! Shared types for cask manifests.
//!
//! Everything here is plain data: architecture tags, validated digests,
//! normalized package names, semver-aware versions and macOS release
//! requirements. No I/O happens in this crate.

pub mod arch;
pub mod hash;
pub mod macos;
pub mod types;

// Re-exports
pub use arch::*;
pub use hash::*;
pub use macos::{MacOsRelease, MacOsRequirement, MacOsVersion};
pub use types::*;
