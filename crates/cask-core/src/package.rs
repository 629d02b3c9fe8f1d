//! TOML cask definition parsing
//!
//! A cask describes one downloadable application: its identity, one
//! variant per architecture tag, the OS installer artifact, the pkgutil
//! receipts to forget on uninstall, the residual paths to zap, and how to
//! check upstream for newer versions.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::types::{MacOsRequirement, PackageName, Version};
use crate::variant::{Variant, render_template};

/// Errors that can occur when loading or parsing a cask definition.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// An I/O error occurred while reading a cask file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The TOML content could not be deserialized into a valid cask.
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The cask declares no `[variants]`.
    #[error("Cask '{0}' declares no variants")]
    NoVariants(String),

    /// A variant URL is empty or not http(s).
    #[error("Variant '{tag}' has an invalid URL: {url}")]
    InvalidUrl {
        /// The variant's architecture tag.
        tag: String,
        /// The offending URL template.
        url: String,
    },

    /// A variant tag has no entry in a non-empty `[arch]` table.
    #[error("Variant '{0}' is not listed in [arch]")]
    UnknownArchTag(String),

    /// The livecheck regex does not compile.
    #[error("Invalid livecheck regex: {0}")]
    InvalidRegex(String),
}

/// Identity and descriptive metadata of a cask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaskInfo {
    /// Unique token that identifies this cask (e.g. `opencloud`).
    pub token: PackageName,
    /// Human-readable application name.
    #[serde(default)]
    pub name: String,
    /// Short human-readable summary.
    #[serde(default)]
    pub desc: String,
    /// URL of the project's homepage.
    #[serde(default)]
    pub homepage: String,
    /// Version string substituted into URL templates.
    pub version: Version,
    /// The application updates itself once installed.
    #[serde(default)]
    pub auto_updates: bool,
}

/// `[depends_on]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependsOn {
    /// Minimum (or exact) macOS release.
    #[serde(default)]
    pub macos: Option<MacOsRequirement>,
}

/// `[install]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallSpec {
    /// Expected installer package file name (template).
    #[serde(default)]
    pub pkg: Option<String>,
}

/// `[uninstall]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UninstallSpec {
    /// Package receipt identifiers, processed in declared order.
    #[serde(default)]
    pub pkgutil: Vec<String>,
}

/// `[zap]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZapSpec {
    /// Residual paths (may start with `~/`), processed in declared order.
    #[serde(default)]
    pub trash: Vec<String>,
}

/// `[livecheck]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LivecheckConfig {
    /// Listing URL; `"url"` or absent means "derive from the download URL".
    #[serde(default)]
    pub url: Option<String>,
    /// Pattern whose first capture group is the version.
    #[serde(default)]
    pub regex: Option<String>,
    /// Named strategy (e.g. `github_releases`, `github_latest`).
    #[serde(default)]
    pub strategy: Option<String>,
}

/// Complete cask definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cask {
    /// Identity and metadata.
    pub cask: CaskInfo,
    /// Manifest tag -> value substituted for `{{arch}}` (e.g. `arm = "arm64"`).
    #[serde(default)]
    pub arch: BTreeMap<String, String>,
    /// Manifest tag -> download variant.
    pub variants: BTreeMap<String, Variant>,
    /// Host requirements.
    #[serde(default)]
    pub depends_on: DependsOn,
    /// Installer artifact.
    #[serde(default)]
    pub install: InstallSpec,
    /// Registry identifiers removed by `uninstall`.
    #[serde(default)]
    pub uninstall: UninstallSpec,
    /// Paths removed by `zap`.
    #[serde(default)]
    pub zap: ZapSpec,
    /// Update-check configuration.
    #[serde(default)]
    pub livecheck: Option<LivecheckConfig>,
}

impl Cask {
    /// Parse a cask definition from a TOML file on disk.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Io` if the file cannot be read, or any parse
    /// or validation error from [`Cask::parse`].
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse and validate a cask definition from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` for malformed TOML (including invalid
    /// digests), or a validation error for structurally bad casks.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let mut cask: Cask = toml::from_str(content)?;
        for (tag, variant) in &mut cask.variants {
            variant.tag.clone_from(tag);
        }
        cask.validate()?;
        Ok(cask)
    }

    fn validate(&self) -> Result<(), ManifestError> {
        if self.variants.is_empty() {
            return Err(ManifestError::NoVariants(self.cask.token.to_string()));
        }
        for (tag, variant) in &self.variants {
            if !variant.url.starts_with("http") {
                return Err(ManifestError::InvalidUrl {
                    tag: tag.clone(),
                    url: variant.url.clone(),
                });
            }
            if !self.arch.is_empty() && !self.arch.contains_key(tag) {
                return Err(ManifestError::UnknownArchTag(tag.clone()));
            }
        }
        if let Some(pattern) = self.livecheck.as_ref().and_then(|l| l.regex.as_deref()) {
            regex::Regex::new(pattern).map_err(|e| ManifestError::InvalidRegex(e.to_string()))?;
        }
        Ok(())
    }

    /// Serialize this cask definition to a pretty-printed TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `toml::ser::Error` if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The cask token.
    pub fn name(&self) -> &PackageName {
        &self.cask.token
    }

    /// The declared version.
    pub fn version(&self) -> &Version {
        &self.cask.version
    }

    /// Declared architecture tags, sorted.
    pub fn supported_tags(&self) -> Vec<String> {
        self.variants.keys().cloned().collect()
    }

    /// Value substituted for `{{arch}}` for the given tag.
    ///
    /// Falls back to the tag itself when `[arch]` has no entry for it.
    pub fn arch_value<'a>(&'a self, tag: &'a str) -> &'a str {
        self.arch.get(tag).map_or(tag, String::as_str)
    }

    /// Concrete download URL for a variant of this cask's version.
    pub fn download_url(&self, variant: &Variant) -> String {
        variant.render_url(&self.cask.version, self.arch_value(&variant.tag))
    }

    /// Expected installer file name for a variant, if `[install].pkg` is set.
    pub fn installer_name(&self, variant: &Variant) -> Option<String> {
        self.install.pkg.as_deref().map(|t| {
            render_template(t, &self.cask.version, self.arch_value(&variant.tag))
        })
    }
}

impl std::str::FromStr for Cask {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
