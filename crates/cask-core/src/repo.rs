/// A validated GitHub repository reference in `owner/repo` format.
///
/// # Example
///
/// ```
/// use cask_core::repo::GitHubRepo;
///
/// let repo = GitHubRepo::new("opencloud-eu/desktop").unwrap();
/// assert_eq!(repo.owner(), "opencloud-eu");
/// assert_eq!(repo.name(), "desktop");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GitHubRepo(String);

impl GitHubRepo {
    /// Create a new `GitHubRepo`, validating the `owner/repo` format.
    ///
    /// # Errors
    ///
    /// Returns an error string if `s` is not in `owner/repo` format or if
    /// either component is empty.
    pub fn new(s: &str) -> Result<Self, String> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self(s.to_string()))
            }
            _ => Err(format!(
                "Invalid GitHub repo format: expected 'owner/repo', got '{s}'"
            )),
        }
    }

    /// Derive the repository from a `github.com` URL such as a release
    /// download link.
    ///
    /// Returns `None` for URLs on other hosts.
    pub fn from_url(url: &str) -> Option<Self> {
        let rest = url
            .strip_prefix("https://github.com/")
            .or_else(|| url.strip_prefix("http://github.com/"))?;
        let mut parts = rest.split('/');
        let owner = parts.next()?;
        let name = parts.next()?.trim_end_matches(".git");
        Self::new(&format!("{owner}/{name}")).ok()
    }

    /// Get the owner part.
    pub fn owner(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }

    /// Get the repo name part.
    pub fn name(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or("")
    }

    /// Return the raw `owner/repo` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Releases listing endpoint under the given API base.
    pub fn releases_url(&self, api_base: &str) -> String {
        format!("{}/repos/{}/releases", api_base.trim_end_matches('/'), self.0)
    }
}

impl std::fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_repo_from_download_url() {
        let url = "https://github.com/opencloud-eu/desktop/releases/download/v1.0.0/x.pkg";
        let repo = GitHubRepo::from_url(url).unwrap();
        assert_eq!(repo.as_str(), "opencloud-eu/desktop");
        assert_eq!(
            repo.releases_url("https://api.github.com/"),
            "https://api.github.com/repos/opencloud-eu/desktop/releases"
        );
    }

    #[test]
    fn rejects_other_hosts_and_bad_input() {
        assert!(GitHubRepo::from_url("https://example.com/a/b").is_none());
        assert!(GitHubRepo::from_url("https://github.com/only-owner").is_none());
        assert!(GitHubRepo::new("a/b/c").is_err());
        assert!(GitHubRepo::new("/b").is_err());
    }
}
