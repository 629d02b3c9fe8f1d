use dirs::home_dir;
use std::path::{Path, PathBuf};

/// Returns the cask home directory, or None if the user's home cannot be resolved.
pub fn try_cask_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("CASK_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".cask"))
}

/// Returns the cask home directory (`~/.cask`).
///
/// Falls back to `./.cask` when neither `CASK_HOME` nor a home directory
/// is available.
pub fn cask_home() -> PathBuf {
    try_cask_home().unwrap_or_else(|| PathBuf::from(".cask"))
}

/// `SQLite` database path: ~/.cask/state.db
pub fn db_path() -> PathBuf {
    cask_home().join("state.db")
}

/// Download cache: ~/.cask/cache
pub fn cache_path() -> PathBuf {
    cask_home().join("cache")
}

/// Local cask definitions: ~/.cask/casks
pub fn casks_path() -> PathBuf {
    cask_home().join("casks")
}

/// Expand a leading `~/` (or a bare `~`) against the user's home directory.
///
/// Without a home directory the path is returned unchanged and stays
/// relative; callers that delete must check [`Path::is_absolute`].
pub fn expand_home(path: &str) -> PathBuf {
    expand_home_in(path, home_dir().as_deref())
}

fn expand_home_in(path: &str, home: Option<&Path>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (p, Some(home)) if p.starts_with("~/") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or("")
}
