//! Shared lifecycle context.
//!
//! Groups the injected host capabilities so the executor takes one value
//! instead of six.

use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::host::{InstallStore, MemoryStore, PackageInstaller, PackageRegistry, PathRemover};
use crate::reporter::{NullReporter, Reporter};
use crate::system::{FsRemover, PkgUtil, SystemInstaller, host_macos_version};
use crate::types::MacOsVersion;

/// Host capabilities used by a [`Lifecycle`](crate::lifecycle::Lifecycle).
#[derive(Clone)]
pub struct Context {
    /// OS installer.
    pub installer: Arc<dyn PackageInstaller>,
    /// Package receipt registry.
    pub registry: Arc<dyn PackageRegistry>,
    /// Filesystem remover.
    pub remover: Arc<dyn PathRemover>,
    /// Install state store.
    pub store: Arc<dyn InstallStore>,
    /// Progress sink.
    pub reporter: Arc<dyn Reporter>,
    /// Host OS version, when known. `None` skips the OS requirement check.
    pub host_os: Option<MacOsVersion>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("host_os", &self.host_os)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Context backed by the real system tools.
    pub fn system(
        config: &EngineConfig,
        store: Arc<dyn InstallStore>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            installer: Arc::new(SystemInstaller::new(config.install_target.clone())),
            registry: Arc::new(PkgUtil::new(config.install_target.clone())),
            remover: Arc::new(FsRemover),
            store,
            reporter,
            host_os: host_macos_version(),
        }
    }

    /// Context with caller-supplied host capabilities, an in-memory store
    /// and a silent reporter.
    pub fn new(
        installer: Arc<dyn PackageInstaller>,
        registry: Arc<dyn PackageRegistry>,
        remover: Arc<dyn PathRemover>,
    ) -> Self {
        Self {
            installer,
            registry,
            remover,
            store: Arc::new(MemoryStore::new()),
            reporter: Arc::new(NullReporter),
            host_os: None,
        }
    }

    /// Replace the install store.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn InstallStore>) -> Self {
        self.store = store;
        self
    }

    /// Replace the reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Set the host OS version used for `depends_on.macos`.
    #[must_use]
    pub fn with_host_os(mut self, host_os: Option<MacOsVersion>) -> Self {
        self.host_os = host_os;
        self
    }
}
