//! Real host capabilities backed by macOS system tools.
//!
//! `installer(8)` places packages, `pkgutil(1)` tracks and forgets receipts,
//! and plain filesystem calls serve zap.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::host::{PackageInstaller, PackageRegistry, PathRemover, Removal, Unregistered};
use crate::types::MacOsVersion;

fn spawn_error(tool: &str, e: io::Error) -> io::Error {
    if e.kind() == io::ErrorKind::NotFound {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("'{tool}' not found; this operation requires macOS"),
        )
    } else {
        io::Error::new(e.kind(), format!("Failed to spawn {tool}: {e}"))
    }
}

/// Runs `installer -pkg <path> -target <target>`.
#[derive(Debug, Clone)]
pub struct SystemInstaller {
    target: PathBuf,
}

impl SystemInstaller {
    /// Installer writing to the given volume (usually `/`).
    pub fn new(target: PathBuf) -> Self {
        Self { target }
    }
}

#[async_trait]
impl PackageInstaller for SystemInstaller {
    async fn run_installer(&self, path: &Path) -> io::Result<i32> {
        debug!("installer -pkg {} -target {}", path.display(), self.target.display());
        let output = Command::new("installer")
            .arg("-pkg")
            .arg(path)
            .arg("-target")
            .arg(&self.target)
            .output()
            .await
            .map_err(|e| spawn_error("installer", e))?;

        if !output.status.success() {
            warn!(
                "installer failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(output.status.code().unwrap_or(-1))
    }
}

/// Package receipt registry driven by `pkgutil`.
///
/// Unregistering removes the files listed in the receipt, then forgets the
/// receipt itself.
#[derive(Debug, Clone)]
pub struct PkgUtil {
    volume: PathBuf,
}

impl PkgUtil {
    /// Registry for receipts on the given volume.
    pub fn new(volume: PathBuf) -> Self {
        Self { volume }
    }

    async fn pkgutil(&self, args: &[&str]) -> io::Result<std::process::Output> {
        Command::new("pkgutil")
            .args(args)
            .arg("--volume")
            .arg(&self.volume)
            .output()
            .await
            .map_err(|e| spawn_error("pkgutil", e))
    }

    async fn install_location(&self, identifier: &str) -> io::Result<Option<PathBuf>> {
        let out = self.pkgutil(&["--pkg-info", identifier]).await?;
        if !out.status.success() {
            return Ok(None);
        }
        let info = String::from_utf8_lossy(&out.stdout);
        let location = info
            .lines()
            .find_map(|l| l.strip_prefix("location:"))
            .map_or("", str::trim);
        Ok(Some(self.volume.join(location)))
    }

    /// Receipt listing (`--only-files` or `--only-dirs`) for `identifier`.
    async fn receipt_entries(&self, identifier: &str, only: &str) -> io::Result<Vec<String>> {
        let out = self.pkgutil(&[only, "--files", identifier]).await?;
        if !out.status.success() {
            return Err(io::Error::other(format!(
                "pkgutil {only} --files {identifier}: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&out.stdout)
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Remove the receipt's directories under `root` that are now empty,
/// deepest first. Directories still holding other files are kept.
async fn prune_empty_dirs(root: &Path, dirs: &[String]) {
    let mut ordered: Vec<&String> = dirs.iter().collect();
    ordered.sort_by_key(|d| std::cmp::Reverse(Path::new(d.as_str()).components().count()));
    for rel in ordered {
        let path = root.join(rel);
        match tokio::fs::remove_dir(&path).await {
            Ok(()) => debug!("pkgutil: removed {}", path.display()),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::NotFound | io::ErrorKind::DirectoryNotEmpty
                ) => {}
            Err(e) => warn!("Failed to remove {}: {e}", path.display()),
        }
    }
}

#[async_trait]
impl PackageRegistry for PkgUtil {
    async fn unregister(&self, identifier: &str) -> io::Result<Unregistered> {
        let Some(root) = self.install_location(identifier).await? else {
            debug!("pkgutil: {identifier} not registered");
            return Ok(Unregistered::NotRegistered);
        };

        let files = self.receipt_entries(identifier, "--only-files").await?;
        let dirs = self.receipt_entries(identifier, "--only-dirs").await?;
        for rel in &files {
            let path = root.join(rel);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(io::Error::new(e.kind(), format!("{}: {e}", path.display()))),
            }
        }
        prune_empty_dirs(&root, &dirs).await;

        let forget = self.pkgutil(&["--forget", identifier]).await?;
        if !forget.status.success() {
            return Err(io::Error::other(format!(
                "pkgutil --forget {identifier}: {}",
                String::from_utf8_lossy(&forget.stderr).trim()
            )));
        }
        Ok(Unregistered::Removed)
    }
}

/// Removes files, symlinks and directory trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

#[async_trait]
impl PathRemover for FsRemover {
    async fn remove_path(&self, path: &Path) -> io::Result<Removal> {
        let meta = match tokio::fs::symlink_metadata(path).await {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Removal::NotFound),
            Err(e) => return Err(e),
        };
        let result = if meta.is_dir() {
            tokio::fs::remove_dir_all(path).await
        } else {
            tokio::fs::remove_file(path).await
        };
        match result {
            Ok(()) => Ok(Removal::Removed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Removal::NotFound),
            Err(e) => Err(e),
        }
    }
}

/// Host macOS version from `sw_vers -productVersion`.
#[cfg(target_os = "macos")]
pub fn host_macos_version() -> Option<MacOsVersion> {
    let output = std::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8_lossy(&output.stdout).parse().ok()
}

/// Host macOS version; always `None` off macOS.
#[cfg(not(target_os = "macos"))]
pub fn host_macos_version() -> Option<MacOsVersion> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fs_remover_handles_files_dirs_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("prefs.plist");
        let tree = dir.path().join("Application Support/OpenCloud");
        std::fs::write(&file, b"x").unwrap();
        std::fs::create_dir_all(tree.join("nested")).unwrap();
        std::fs::write(tree.join("nested/db"), b"y").unwrap();

        assert_eq!(FsRemover.remove_path(&file).await.unwrap(), Removal::Removed);
        assert_eq!(FsRemover.remove_path(&tree).await.unwrap(), Removal::Removed);
        assert_eq!(FsRemover.remove_path(&file).await.unwrap(), Removal::NotFound);
        assert!(!tree.exists());
    }

    #[tokio::test]
    async fn prunes_emptied_bundle_skeleton_deepest_first() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("Demo.app/Contents/MacOS")).unwrap();
        std::fs::create_dir_all(root.join("Shared")).unwrap();
        std::fs::write(root.join("Shared/other-app.plist"), b"x").unwrap();

        let dirs: Vec<String> = [
            "Demo.app",
            "Shared",
            "Demo.app/Contents/MacOS",
            "Demo.app/Contents",
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        prune_empty_dirs(root, &dirs).await;

        assert!(!root.join("Demo.app").exists());
        assert!(root.join("Shared/other-app.plist").exists());

        prune_empty_dirs(root, &dirs).await;
        assert!(root.join("Shared").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn fs_remover_removes_symlink_not_target() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        std::fs::create_dir(&target).unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(FsRemover.remove_path(&link).await.unwrap(), Removal::Removed);
        assert!(target.exists());
    }
}
