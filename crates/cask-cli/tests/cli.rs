//! Integration tests for the cask CLI binary.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const OPENCLOUD: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../casks/opencloud.toml");

/// Runs the binary against a throwaway HOME and CASK_HOME.
struct TestContext {
    temp_dir: TempDir,
    cask_home: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let cask_home = temp_dir.path().join(".cask");
        std::fs::create_dir_all(&cask_home).expect("failed to create cask home");
        Self {
            temp_dir,
            cask_home,
        }
    }

    fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    fn cask_cmd(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cask"));
        cmd.env("HOME", self.home())
            .env("CASK_HOME", &self.cask_home)
            .env("NO_COLOR", "1")
            .env_remove("CASK_HOST_ARCH")
            .env_remove("CASK_GITHUB_API")
            .env_remove("GITHUB_TOKEN");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cask_cmd()
            .args(args)
            .output()
            .expect("failed to run cask")
    }

    /// Write a manifest whose variants share `sha256` and whose zap list is
    /// `trash`.
    fn manifest(&self, sha256: &str, pkgutil: &[&str], trash: &[PathBuf]) -> PathBuf {
        let pkgutil: Vec<_> = pkgutil.iter().map(|s| format!("'{s}'")).collect();
        let trash: Vec<_> = trash.iter().map(|p| format!("'{}'", p.display())).collect();
        let body = format!(
            r#"
[cask]
token = "scratch"
version = "2.0.0"

[variants.arm]
url = "https://example.com/scratch-{{{{version}}}}-arm.pkg"
sha256 = "{sha256}"

[variants.intel]
url = "https://example.com/scratch-{{{{version}}}}-intel.pkg"
sha256 = "{sha256}"

[uninstall]
pkgutil = [{}]

[zap]
trash = [{}]
"#,
            pkgutil.join(", "),
            trash.join(", ")
        );
        let path = self.home().join("scratch.toml");
        std::fs::write(&path, body).unwrap();
        path
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--version"]);
    assert!(output.status.success());
    assert!(stdout(&output).starts_with("cask "));
}

#[test]
fn test_info_from_manifest_path() {
    let ctx = TestContext::new();
    let output = ctx.run(&["info", OPENCLOUD]);
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("opencloud"));
    assert!(out.contains("1.0.0-rc.1"));
    assert!(out.contains("macOS >= monterey"));
    assert!(out.contains("eu.opencloud.finderPlugin"));
    assert!(out.contains("OpenCloud_Desktop-v1.0.0-rc.1-macos-clang-x86_64.pkg"));
    assert!(ctx.cask_home.join("state.db").exists());
}

#[test]
fn test_info_by_token() {
    let ctx = TestContext::new();
    let casks = ctx.cask_home.join("casks");
    std::fs::create_dir_all(&casks).unwrap();
    std::fs::copy(OPENCLOUD, casks.join("opencloud.toml")).unwrap();

    let output = ctx.run(&["info", "opencloud"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("OpenCloud Desktop"));
}

#[test]
fn test_unknown_cask_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["info", "does-not-exist"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not found"));
}

#[test]
fn test_list_empty() {
    let ctx = TestContext::new();
    let output = ctx.run(&["list"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("No casks installed."));
}

#[test]
fn test_hash_command() {
    let ctx = TestContext::new();
    let file = ctx.home().join("hello.txt");
    std::fs::write(&file, b"hello").unwrap();

    let output = ctx.run(&["hash", file.to_str().unwrap()]);
    assert!(output.status.success());
    assert!(
        stdout(&output)
            .starts_with("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
    );
}

#[test]
fn test_dry_run_fetch_selects_requested_arch() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--dry-run", "fetch", OPENCLOUD, "--arch", "x86_64"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    assert!(out.contains("macos-clang-x86_64.pkg"));
    assert!(out.contains("95443b0ea69d40d5916965aa7e3155bd10d048598a942fd9e78c519c1e1cdb7d--"));
}

#[test]
fn test_unsupported_arch_fails() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--dry-run", "fetch", OPENCLOUD, "--arch", "ppc"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unsupported architecture 'ppc'"));
}

#[test]
fn test_dry_run_install_verifies_local_artifact() {
    let ctx = TestContext::new();
    let artifact = ctx.home().join("scratch.pkg");
    std::fs::write(&artifact, b"not really a pkg").unwrap();

    let hashed = ctx.run(&["hash", artifact.to_str().unwrap()]);
    let digest = stdout(&hashed)
        .split_whitespace()
        .next()
        .unwrap()
        .to_string();

    let good = ctx.manifest(&digest, &[], &[]);
    let output = ctx.run(&[
        "--dry-run",
        "install",
        good.to_str().unwrap(),
        "--artifact",
        artifact.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Would install scratch 2.0.0"));

    let bad = ctx.manifest(&"0".repeat(64), &[], &[]);
    let output = ctx.run(&[
        "--dry-run",
        "install",
        bad.to_str().unwrap(),
        "--artifact",
        artifact.to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Checksum mismatch"));
}

#[test]
fn test_zap_removes_paths_and_is_idempotent() {
    let ctx = TestContext::new();
    let prefs = ctx.home().join("prefs.plist");
    let support = ctx.home().join("Support/Scratch");
    std::fs::write(&prefs, b"x").unwrap();
    std::fs::create_dir_all(support.join("nested")).unwrap();

    let manifest = ctx.manifest(&"ab".repeat(32), &[], &[prefs.clone(), support.clone()]);
    let manifest = manifest.to_str().unwrap();

    let output = ctx.run(&["zap", manifest]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("2 removed, 0 already gone"));
    assert!(!prefs.exists());
    assert!(!support.exists());

    let output = ctx.run(&["zap", manifest]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("0 removed, 2 already gone"));
}

#[test]
fn test_dry_run_zap_lists_expanded_paths() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--dry-run", "zap", OPENCLOUD]);
    assert!(output.status.success(), "{}", stderr(&output));

    let expected = ctx.home().join("Library/Application Support/OpenCloud");
    assert!(stdout(&output).contains(&expected.display().to_string()));
}

#[test]
fn test_uninstall_with_nothing_registered() {
    let ctx = TestContext::new();
    let leftover = ctx.home().join("leftover");
    std::fs::write(&leftover, b"x").unwrap();
    let manifest = ctx.manifest(&"ab".repeat(32), &[], &[leftover.clone()]);

    let output = ctx.run(&["uninstall", manifest.to_str().unwrap(), "--zap"]);
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Uninstalled scratch"));
    assert!(out.contains("Zapped scratch"));
    assert!(!leftover.exists());
}

#[test]
fn test_livecheck_against_mock_api() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/repos/opencloud-eu/desktop/releases")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[
                {"tag_name": "v1.0.0", "draft": false, "prerelease": false},
                {"tag_name": "v1.0.0-rc.1", "draft": false, "prerelease": true},
                {"tag_name": "v0.9.0", "draft": true, "prerelease": false}
            ]"#,
        )
        .create();

    let ctx = TestContext::new();
    let output = ctx
        .cask_cmd()
        .env("CASK_GITHUB_API", server.url())
        .args(["livecheck", OPENCLOUD])
        .output()
        .expect("failed to run cask");

    mock.assert();
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("latest"));
    assert!(out.contains("draft"));
    assert!(out.contains("update available"));
}

#[test]
fn test_completions() {
    let ctx = TestContext::new();
    let output = ctx.run(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("cask"));
}
