//! Lifecycle executor.
//!
//! Drives one cask through download, verification, installation, uninstall
//! and zap. Installation is gated on a successful verification of the exact
//! artifact path by this executor. Uninstall and zap are best effort: every
//! target is attempted and failures are reported together.
//!
//! A download in flight can be cancelled from another task through a
//! [`CancelHandle`]. Once the OS installer (or a teardown) is running the
//! request is rejected with [`LifecycleError::NotCancellable`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::{Failure, LifecycleError};
use crate::host::{ArtifactFetcher, FetchRequest, InstallRecord, Removal, Unregistered};
use crate::package::Cask;
use crate::paths::expand_home;
use crate::types::Version;
use crate::variant::{Variant, select_variant};
use crate::verify::verify_file;

/// Executor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Nothing in progress and nothing verified yet.
    Idle,
    /// Fetching the artifact.
    Downloading,
    /// Hashing the artifact.
    Verifying,
    /// An artifact passed verification and may be installed.
    Verified,
    /// The OS installer is running.
    Installing,
    /// Installation finished.
    Installed,
    /// Receipts are being removed.
    Uninstalling,
    /// Uninstall finished.
    Uninstalled,
    /// Residual paths are being removed.
    Zapping,
    /// Zap finished.
    Zapped,
}

impl LifecycleState {
    /// States in which no operation is running.
    pub fn is_resting(self) -> bool {
        matches!(
            self,
            Self::Idle | Self::Verified | Self::Installed | Self::Uninstalled | Self::Zapped
        )
    }

    /// Whether the executor may move from `self` to `to`.
    ///
    /// Any operation may start from a resting state. A running operation
    /// ends in its own completion state, or back in `Idle` when it fails.
    pub fn can_transition_to(self, to: Self) -> bool {
        use LifecycleState::{
            Downloading, Idle, Installed, Installing, Uninstalled, Uninstalling, Verified,
            Verifying, Zapped, Zapping,
        };
        match (self, to) {
            (from, Downloading | Verifying | Installing | Uninstalling | Zapping)
                if from.is_resting() =>
            {
                true
            }
            (Downloading, Verifying | Idle)
            | (Verifying, Verified | Idle)
            | (Installing, Installed | Idle)
            | (Uninstalling, Uninstalled | Idle)
            | (Zapping, Zapped | Idle) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Downloading => "downloading",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Uninstalling => "uninstalling",
            Self::Uninstalled => "uninstalled",
            Self::Zapping => "zapping",
            Self::Zapped => "zapped",
        };
        f.write_str(s)
    }
}

/// Result of a successful lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The installer ran and the store was updated.
    Installed {
        /// Installed version.
        version: Version,
    },
    /// The same version and artifact were already recorded as installed.
    AlreadyInstalled {
        /// Installed version.
        version: Version,
    },
    /// Every receipt was removed or was not registered.
    Uninstalled {
        /// Identifiers that were removed.
        removed: Vec<String>,
        /// Identifiers that were not registered.
        absent: Vec<String>,
    },
    /// Every zap path was removed or did not exist.
    Zapped {
        /// Paths that were removed, as declared.
        removed: Vec<String>,
        /// Paths that did not exist, as declared.
        absent: Vec<String>,
    },
}

/// An artifact that passed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedArtifact {
    /// Path that was hashed.
    pub path: PathBuf,
    /// Computed digest.
    pub digest: String,
}

#[derive(Debug)]
struct Shared {
    state: LifecycleState,
    token: Option<CancellationToken>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Requests cancellation of an executor's in-flight download.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    shared: Arc<Mutex<Shared>>,
}

impl CancelHandle {
    /// Cancel the current operation if it is a download.
    ///
    /// Returns `Ok(true)` when a download was cancelled and `Ok(false)` when
    /// nothing cancellable is running.
    ///
    /// # Errors
    ///
    /// `NotCancellable` while the installer, uninstall or zap is running.
    pub fn cancel(&self) -> Result<bool, LifecycleError> {
        let shared = lock(&self.shared);
        match shared.state {
            LifecycleState::Downloading => {
                if let Some(token) = &shared.token {
                    token.cancel();
                }
                Ok(true)
            }
            state @ (LifecycleState::Installing
            | LifecycleState::Uninstalling
            | LifecycleState::Zapping) => Err(LifecycleError::NotCancellable { state }),
            _ => Ok(false),
        }
    }

    /// Current executor state.
    pub fn state(&self) -> LifecycleState {
        lock(&self.shared).state
    }
}

/// Executes the lifecycle of a single cask.
#[derive(Debug)]
pub struct Lifecycle<'a> {
    cask: &'a Cask,
    ctx: Context,
    shared: Arc<Mutex<Shared>>,
    verified: Option<VerifiedArtifact>,
}

impl<'a> Lifecycle<'a> {
    /// New executor in the `Idle` state.
    pub fn new(cask: &'a Cask, ctx: Context) -> Self {
        Self {
            cask,
            ctx,
            shared: Arc::new(Mutex::new(Shared {
                state: LifecycleState::Idle,
                token: None,
            })),
            verified: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        lock(&self.shared).state
    }

    /// Handle that can cancel downloads from another task.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// The last artifact that passed verification, if any.
    pub fn verified(&self) -> Option<&VerifiedArtifact> {
        self.verified.as_ref()
    }

    /// Select the variant for a host architecture tag.
    ///
    /// # Errors
    ///
    /// `UnsupportedArchitecture` when the cask has no such variant.
    pub fn select(&self, host_tag: &str) -> Result<&'a Variant, LifecycleError> {
        select_variant(self.cask, host_tag)
    }

    fn transition(&self, to: LifecycleState) -> Result<(), LifecycleError> {
        let mut shared = lock(&self.shared);
        Self::apply(&mut shared, to)
    }

    fn apply(shared: &mut Shared, to: LifecycleState) -> Result<(), LifecycleError> {
        let from = shared.state;
        if !from.can_transition_to(to) {
            return Err(LifecycleError::InvalidTransition { from, to });
        }
        debug!("lifecycle: {from} -> {to}");
        shared.state = to;
        if to != LifecycleState::Downloading {
            shared.token = None;
        }
        Ok(())
    }

    fn begin_download(&self) -> Result<CancellationToken, LifecycleError> {
        let mut shared = lock(&self.shared);
        Self::apply(&mut shared, LifecycleState::Downloading)?;
        let token = CancellationToken::new();
        shared.token = Some(token.clone());
        Ok(token)
    }

    /// Leave `Downloading` for `Verifying` unless a cancel landed after the
    /// fetch completed. Both happen under the lock [`CancelHandle::cancel`]
    /// takes, so an acknowledged cancel always wins.
    fn end_download(&self, token: &CancellationToken) -> Result<(), LifecycleError> {
        let mut shared = lock(&self.shared);
        if token.is_cancelled() {
            return Err(LifecycleError::Cancelled);
        }
        Self::apply(&mut shared, LifecycleState::Verifying)
    }

    /// Download `variant` to `dest` and verify it.
    ///
    /// An existing file at `dest` is verified instead of re-downloaded; if it
    /// fails verification it is discarded and fetched again. A cancelled or
    /// failed download removes the partial file and returns to `Idle`.
    ///
    /// # Errors
    ///
    /// `Cancelled`, `Fetch`, or any verification error. A file that fails
    /// verification is deleted.
    pub async fn acquire(
        &mut self,
        fetcher: &dyn ArtifactFetcher,
        variant: &Variant,
        dest: &Path,
    ) -> Result<PathBuf, LifecycleError> {
        let cask = self.cask;
        let name = cask.name();
        let version = cask.version();

        if tokio::fs::try_exists(dest).await.unwrap_or(false) {
            debug!("Found cached artifact {}", dest.display());
            match self.verify(variant, dest).await {
                Ok(()) => {
                    self.ctx.reporter.info(&format!("Using cached {}", dest.display()));
                    return Ok(dest.to_path_buf());
                }
                Err(e) => {
                    warn!("Discarding cached artifact {}: {e}", dest.display());
                    discard(dest).await;
                }
            }
        }

        let token = self.begin_download()?;
        if let Some(parent) = dest.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                self.transition(LifecycleState::Idle)?;
                return Err(e.into());
            }
        }

        let url = cask.download_url(variant);
        let reporter = Arc::clone(&self.ctx.reporter);
        let req = FetchRequest {
            name,
            version,
            url: &url,
            dest,
        };

        let result = tokio::select! {
            biased;
            () = token.cancelled() => Err(LifecycleError::Cancelled),
            r = fetcher.fetch(req, reporter.as_ref()) => r.map_err(LifecycleError::from),
        };

        let result = result.and_then(|bytes| {
            debug!("Downloaded {bytes} bytes from {url}");
            self.end_download(&token)
        });
        if let Err(e) = result {
            discard(dest).await;
            self.transition(LifecycleState::Idle)?;
            self.ctx.reporter.failed(name, version, &e.to_string());
            return Err(e);
        }

        if let Err(e) = self.check_artifact(variant, dest).await {
            discard(dest).await;
            return Err(e);
        }
        Ok(dest.to_path_buf())
    }

    /// Verify the artifact at `path` against `variant`'s digest.
    ///
    /// On success the artifact becomes eligible for [`install`](Self::install).
    ///
    /// # Errors
    ///
    /// `EmptyArtifact`, `ChecksumMismatch`, or `Io`.
    pub async fn verify(&mut self, variant: &Variant, path: &Path) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Verifying)?;
        self.check_artifact(variant, path).await
    }

    async fn check_artifact(&mut self, variant: &Variant, path: &Path) -> Result<(), LifecycleError> {
        self.ctx
            .reporter
            .verifying(self.cask.name(), self.cask.version());

        match verify_file(path, &variant.sha256).await {
            Ok(digest) => {
                self.verified = Some(VerifiedArtifact {
                    path: path.to_path_buf(),
                    digest,
                });
                self.transition(LifecycleState::Verified)
            }
            Err(e) => {
                self.verified = None;
                self.transition(LifecycleState::Idle)?;
                let err = LifecycleError::from(e);
                self.ctx
                    .reporter
                    .failed(self.cask.name(), self.cask.version(), &err.to_string());
                Err(err)
            }
        }
    }

    fn check_verified(&self, variant: &Variant, path: &Path) -> Result<String, LifecycleError> {
        self.verified
            .as_ref()
            .filter(|v| v.path == path && variant.sha256.matches(&v.digest))
            .map(|v| v.digest.clone())
            .ok_or_else(|| LifecycleError::UnverifiedArtifact {
                path: path.to_path_buf(),
            })
    }

    fn check_host_os(&self) -> Result<(), LifecycleError> {
        if let (Some(required), Some(host)) = (self.cask.depends_on.macos, self.ctx.host_os) {
            if !required.is_satisfied_by(host) {
                return Err(LifecycleError::UnsupportedOs { required, host });
            }
        }
        Ok(())
    }

    fn check_installer_name(&self, variant: &Variant, path: &Path) {
        let Some(expected) = self.cask.installer_name(variant) else {
            return;
        };
        let actual = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let cached = format!("--{expected}");
        if actual != expected && !actual.ends_with(&cached) {
            let msg = format!("Artifact '{actual}' does not match expected installer '{expected}'");
            warn!("{msg}");
            self.ctx.reporter.warning(&msg);
        }
    }

    /// Hand a verified artifact to the OS installer.
    ///
    /// Installing a version whose artifact is already recorded in the store
    /// is a no-op returning [`LifecycleOutcome::AlreadyInstalled`].
    ///
    /// # Errors
    ///
    /// `UnverifiedArtifact` unless [`verify`](Self::verify) (or
    /// [`acquire`](Self::acquire)) passed for exactly this path and digest,
    /// `UnsupportedOs`, `InstallerFailed`, `Io`, or `Store`.
    pub async fn install(
        &mut self,
        variant: &Variant,
        path: &Path,
    ) -> Result<LifecycleOutcome, LifecycleError> {
        let digest = self.check_verified(variant, path)?;
        self.check_host_os()?;

        let name = self.cask.name();
        let version = self.cask.version();

        if let Some(existing) = self.ctx.store.get(name)? {
            if existing.version == *version && existing.sha256 == digest {
                self.transition(LifecycleState::Installing)?;
                self.transition(LifecycleState::Installed)?;
                info!("{name} {version} is already installed");
                return Ok(LifecycleOutcome::AlreadyInstalled {
                    version: version.clone(),
                });
            }
        }

        self.check_installer_name(variant, path);
        self.transition(LifecycleState::Installing)?;
        self.ctx.reporter.installing(name, version);

        let exit_code = match self.ctx.installer.run_installer(path).await {
            Ok(code) => code,
            Err(e) => {
                self.transition(LifecycleState::Idle)?;
                self.ctx.reporter.failed(name, version, &e.to_string());
                return Err(e.into());
            }
        };
        if exit_code != 0 {
            self.transition(LifecycleState::Idle)?;
            let err = LifecycleError::InstallerFailed { exit_code };
            self.ctx.reporter.failed(name, version, &err.to_string());
            return Err(err);
        }

        self.transition(LifecycleState::Installed)?;
        self.ctx.store.put(&InstallRecord {
            name: name.clone(),
            version: version.clone(),
            arch: variant.tag.clone(),
            sha256: digest,
            installed_at: chrono::Utc::now().timestamp(),
        })?;
        self.ctx.reporter.done(name, version, "installed", None);

        Ok(LifecycleOutcome::Installed {
            version: version.clone(),
        })
    }

    /// Remove every declared package receipt, in declared order.
    ///
    /// Identifiers that are not registered count as success, so uninstalling
    /// a cask that was never installed is a no-op.
    ///
    /// # Errors
    ///
    /// `PartialUninstallFailure` naming every identifier that failed, after
    /// all of them were attempted.
    pub async fn uninstall(&mut self) -> Result<LifecycleOutcome, LifecycleError> {
        self.transition(LifecycleState::Uninstalling)?;
        let name = self.cask.name();

        let mut removed = Vec::new();
        let mut absent = Vec::new();
        let mut failed = Vec::new();

        for id in &self.cask.uninstall.pkgutil {
            self.ctx.reporter.removing(name, id);
            match self.ctx.registry.unregister(id).await {
                Ok(Unregistered::Removed) => removed.push(id.clone()),
                Ok(Unregistered::NotRegistered) => absent.push(id.clone()),
                Err(e) => {
                    warn!("Failed to unregister {id}: {e}");
                    failed.push(Failure {
                        target: id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failed.is_empty() {
            self.transition(LifecycleState::Idle)?;
            return Err(LifecycleError::PartialUninstallFailure { failed, removed });
        }

        self.transition(LifecycleState::Uninstalled)?;
        self.ctx.store.remove(name)?;
        Ok(LifecycleOutcome::Uninstalled { removed, absent })
    }

    /// Remove every declared residual path, in declared order.
    ///
    /// Missing paths count as success, so zap is idempotent.
    ///
    /// # Errors
    ///
    /// `PartialZapFailure` naming every path that failed, after all of them
    /// were attempted.
    pub async fn zap(&mut self) -> Result<LifecycleOutcome, LifecycleError> {
        self.transition(LifecycleState::Zapping)?;
        let name = self.cask.name();

        let mut removed = Vec::new();
        let mut absent = Vec::new();
        let mut failed = Vec::new();

        for entry in &self.cask.zap.trash {
            let path = expand_home(entry);
            if !path.is_absolute() {
                warn!("Refusing to zap relative path {}", path.display());
                failed.push(Failure {
                    target: entry.clone(),
                    reason: "not an absolute path (is the home directory known?)".to_string(),
                });
                continue;
            }
            self.ctx.reporter.removing(name, entry);
            match self.ctx.remover.remove_path(&path).await {
                Ok(Removal::Removed) => removed.push(entry.clone()),
                Ok(Removal::NotFound) => absent.push(entry.clone()),
                Err(e) => {
                    warn!("Failed to remove {}: {e}", path.display());
                    failed.push(Failure {
                        target: entry.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if !failed.is_empty() {
            self.transition(LifecycleState::Idle)?;
            return Err(LifecycleError::PartialZapFailure { failed, removed });
        }

        self.transition(LifecycleState::Zapped)?;
        Ok(LifecycleOutcome::Zapped { removed, absent })
    }
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove {}: {e}", path.display());
        }
    }
}
