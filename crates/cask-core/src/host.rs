//! Capabilities the engine consumes from the host system.
//!
//! The lifecycle executor never touches the OS directly. Installers, the
//! package receipt registry, the filesystem, the network and the install
//! state store are all injected through these traits so the same engine
//! runs against the real system (see [`crate::system`]) or test doubles.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, StoreError};
use crate::livecheck::Release;
use crate::reporter::Reporter;
use crate::types::{PackageName, Version};

/// Runs the OS package installer.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install the package at `path`, returning the installer's exit code.
    async fn run_installer(&self, path: &Path) -> io::Result<i32>;
}

/// Outcome of a registry removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unregistered {
    /// The receipt existed and was removed.
    Removed,
    /// No receipt was registered under the identifier.
    NotRegistered,
}

/// The OS package receipt registry (`pkgutil` on macOS).
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Remove the package registered under `identifier`.
    async fn unregister(&self, identifier: &str) -> io::Result<Unregistered>;
}

/// Outcome of a path removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The path existed and was removed.
    Removed,
    /// Nothing existed at the path.
    NotFound,
}

/// Filesystem removal used by zap.
#[async_trait]
pub trait PathRemover: Send + Sync {
    /// Remove a file, symlink or directory tree.
    async fn remove_path(&self, path: &Path) -> io::Result<Removal>;
}

/// Lists releases for update checks.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the release listing at `url`, in the listing's own order.
    async fn fetch(&self, url: &str) -> Result<Vec<Release>, FetchError>;
}

/// A single artifact download.
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    /// Package being fetched (for progress reporting).
    pub name: &'a PackageName,
    /// Version being fetched (for progress reporting).
    pub version: &'a Version,
    /// Concrete download URL.
    pub url: &'a str,
    /// Destination file.
    pub dest: &'a Path,
}

/// Downloads artifacts.
///
/// Timeouts are the fetcher's responsibility and surface as
/// [`FetchError::Timeout`].
#[async_trait]
pub trait ArtifactFetcher: Send + Sync {
    /// Stream `req.url` into `req.dest`, returning the number of bytes written.
    async fn fetch(&self, req: FetchRequest<'_>, reporter: &dyn Reporter)
    -> Result<u64, FetchError>;
}

/// What the store remembers about an installed cask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallRecord {
    /// Cask token.
    pub name: PackageName,
    /// Installed version.
    pub version: Version,
    /// Manifest architecture tag of the installed variant.
    pub arch: String,
    /// Digest of the installed artifact.
    pub sha256: String,
    /// Unix timestamp of the installation.
    pub installed_at: i64,
}

/// Persistent key-value store of installed casks, keyed by token.
pub trait InstallStore: Send + Sync {
    /// Look up a cask.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backing store cannot be read.
    fn get(&self, name: &PackageName) -> Result<Option<InstallRecord>, StoreError>;

    /// Insert or replace a record.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backing store cannot be written.
    fn put(&self, record: &InstallRecord) -> Result<(), StoreError>;

    /// Forget a cask. Removing an unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backing store cannot be written.
    fn remove(&self, name: &PackageName) -> Result<(), StoreError>;

    /// All records, ordered by token.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the backing store cannot be read.
    fn list(&self) -> Result<Vec<InstallRecord>, StoreError>;
}

/// In-memory [`InstallStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<PackageName, InstallRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PackageName, InstallRecord>> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl InstallStore for MemoryStore {
    fn get(&self, name: &PackageName) -> Result<Option<InstallRecord>, StoreError> {
        Ok(self.lock().get(name).cloned())
    }

    fn put(&self, record: &InstallRecord) -> Result<(), StoreError> {
        self.lock().insert(record.name.clone(), record.clone());
        Ok(())
    }

    fn remove(&self, name: &PackageName) -> Result<(), StoreError> {
        self.lock().remove(name);
        Ok(())
    }

    fn list(&self) -> Result<Vec<InstallRecord>, StoreError> {
        Ok(self.lock().values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, version: &str) -> InstallRecord {
        InstallRecord {
            name: PackageName::from(name),
            version: Version::from(version),
            arch: "arm".to_string(),
            sha256: "00".repeat(32),
            installed_at: 0,
        }
    }

    #[test]
    fn memory_store_replaces_and_forgets() {
        let store = MemoryStore::new();
        store.put(&record("b", "1.0")).unwrap();
        store.put(&record("a", "1.0")).unwrap();
        store.put(&record("a", "2.0")).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "a");
        assert_eq!(all[0].version, "2.0");

        store.remove(&PackageName::from("a")).unwrap();
        store.remove(&PackageName::from("missing")).unwrap();
        assert!(store.get(&PackageName::from("a")).unwrap().is_none());
    }
}
