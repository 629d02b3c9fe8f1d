//! Cask lifecycle engine.
//!
//! Parses cask definitions, selects the variant for the host architecture,
//! verifies downloaded artifacts, drives install / uninstall / zap through
//! injected host capabilities, and checks upstream release listings for
//! newer versions.

pub mod config;
pub mod context;
pub mod error;
pub mod host;
#[cfg(feature = "network")]
pub mod io;
pub mod lifecycle;
pub mod livecheck;
pub mod package;
pub mod paths;
pub mod repo;
pub mod reporter;
pub mod strategies;
pub mod system;
pub mod types;
pub mod variant;
pub mod verify;

pub use config::EngineConfig;
pub use context::Context;
pub use error::{Failure, FetchError, LifecycleError, LivecheckError, StoreError};
pub use lifecycle::{CancelHandle, Lifecycle, LifecycleOutcome, LifecycleState};
pub use livecheck::{Release, UpdateCheckResult, check_for_updates};
pub use package::{Cask, ManifestError};
pub use paths::*;
pub use reporter::{NullReporter, Reporter};
pub use strategies::{MatchStrategy, StrategyRegistry, TagMatcher};
pub use variant::{Variant, select_variant};
pub use verify::{IntegrityError, verify, verify_file};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("cask-core/", env!("CARGO_PKG_VERSION"));
