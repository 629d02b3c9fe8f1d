//! cask - macOS application casks
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
//!
//! Installs, removes and update-checks macOS applications described by TOML
//! cask manifests.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.cask/
//! ├── casks/      # Local manifests, looked up by token
//! ├── cache/      # Downloaded installers (<sha256>--<file>)
//! └── state.db    # SQLite install records
//! ```

pub mod cmd;
pub mod store;
pub mod ui;

pub use cask_core::paths::*;
pub use cask_core::{Cask, EngineConfig};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "cask")]
#[command(author, version, about = "cask - macOS application casks")]
pub struct Cli {
    /// Show what would happen without making changes
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show a cask's definition and install state
    Info {
        /// Manifest path or token
        cask: String,
    },
    /// Download and verify a cask's installer
    Fetch {
        /// Manifest path or token
        cask: String,
        /// Architecture tag or alias (arm, intel, arm64, x86_64)
        #[arg(long, env = "CASK_HOST_ARCH")]
        arch: Option<String>,
    },
    /// Install a cask
    Install {
        /// Manifest path or token
        cask: String,
        /// Architecture tag or alias (arm, intel, arm64, x86_64)
        #[arg(long, env = "CASK_HOST_ARCH")]
        arch: Option<String>,
        /// Install a local installer instead of downloading one
        #[arg(long)]
        artifact: Option<PathBuf>,
    },
    /// Remove a cask's package receipts
    Uninstall {
        /// Manifest path or token
        cask: String,
        /// Also remove residual files
        #[arg(long)]
        zap: bool,
    },
    /// Remove a cask's residual files
    Zap {
        /// Manifest path or token
        cask: String,
    },
    /// Check upstream for a newer release
    Livecheck {
        /// Manifest path or token
        cask: String,
    },
    /// List installed casks
    List,
    /// Compute SHA256 hash of a file (for cask authoring)
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

/// Load a cask from a manifest path, or by token from `~/.cask/casks`.
pub fn resolve_cask(arg: &str) -> Result<(Cask, PathBuf)> {
    let direct = Path::new(arg);
    let path = if direct.is_file() || arg.ends_with(".toml") {
        direct.to_path_buf()
    } else {
        casks_path().join(format!("{arg}.toml"))
    };

    if !path.is_file() {
        bail!("Cask '{arg}' not found (looked for {})", path.display());
    }
    let cask = Cask::from_file(&path)
        .with_context(|| format!("Failed to load cask {}", path.display()))?;
    Ok((cask, path))
}

/// Manifest tag for this invocation: `--arch` if given, else the engine's
/// host tag.
pub fn host_tag(config: &EngineConfig, arch: Option<&str>) -> String {
    match arch {
        Some(raw) => EngineConfig {
            host_arch: Some(raw.to_string()),
            ..config.clone()
        }
        .host_tag(),
        None => config.host_tag(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_install_flags() {
        let cli = Cli::parse_from([
            "cask",
            "--dry-run",
            "install",
            "opencloud",
            "--arch",
            "x86_64",
            "--artifact",
            "/tmp/x.pkg",
        ]);
        assert!(cli.dry_run);
        match cli.command {
            Commands::Install {
                cask,
                arch,
                artifact,
            } => {
                assert_eq!(cask, "opencloud");
                assert_eq!(arch.as_deref(), Some("x86_64"));
                assert_eq!(artifact, Some(PathBuf::from("/tmp/x.pkg")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn arch_aliases_map_to_manifest_tags() {
        let config = EngineConfig::default();
        assert_eq!(host_tag(&config, Some("x86_64")), "intel");
        assert_eq!(host_tag(&config, Some("aarch64")), "arm");
        assert_eq!(host_tag(&config, Some("riscv")), "riscv");
    }

    #[test]
    fn missing_manifest_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = resolve_cask(missing.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
