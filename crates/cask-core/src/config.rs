//! Engine configuration read from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::Arch;

/// Default GitHub REST API base.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Default network timeout for artifact and listing fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(300);

/// Runtime settings for the lifecycle engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// GitHub API base used by livecheck (`CASK_GITHUB_API`).
    pub github_api: String,
    /// Optional bearer token (`GITHUB_TOKEN`).
    pub github_token: Option<String>,
    /// Volume passed to `installer -target` (`CASK_INSTALL_TARGET`).
    pub install_target: PathBuf,
    /// Network timeout (`CASK_FETCH_TIMEOUT_SECS`).
    pub fetch_timeout: Duration,
    /// Manifest architecture tag override (`CASK_HOST_ARCH`).
    pub host_arch: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            github_api: DEFAULT_GITHUB_API.to_string(),
            github_token: None,
            install_target: PathBuf::from("/"),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            host_arch: None,
        }
    }
}

impl EngineConfig {
    /// Build a configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let fetch_timeout = match non_empty("CASK_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().map(Duration::from_secs).unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid CASK_FETCH_TIMEOUT_SECS={raw}");
                defaults.fetch_timeout
            }),
            None => defaults.fetch_timeout,
        };

        Self {
            github_api: non_empty("CASK_GITHUB_API").unwrap_or(defaults.github_api),
            github_token: non_empty("GITHUB_TOKEN"),
            install_target: non_empty("CASK_INSTALL_TARGET")
                .map_or(defaults.install_target, PathBuf::from),
            fetch_timeout,
            host_arch: non_empty("CASK_HOST_ARCH"),
        }
    }

    /// Manifest tag for this host: the override if set, else the detected
    /// architecture's cask tag.
    pub fn host_tag(&self) -> String {
        match &self.host_arch {
            Some(raw) => raw
                .parse::<Arch>()
                .map_or_else(|_| raw.clone(), |a| a.cask_tag().to_string()),
            None => Arch::current().cask_tag().to_string(),
        }
    }
}
