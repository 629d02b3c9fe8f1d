//! GitHub releases listing.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use tracing::debug;

use super::fetch_error;
use crate::config::DEFAULT_GITHUB_API;
use crate::error::FetchError;
use crate::host::ReleaseSource;
use crate::livecheck::Release;
use crate::repo::GitHubRepo;

/// [`ReleaseSource`] backed by the GitHub REST API.
///
/// Accepts either an API releases URL or any `github.com/<owner>/<repo>/…`
/// URL (such as a release download link), which is mapped onto
/// `{api}/repos/<owner>/<repo>/releases`.
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubReleases {
    /// Source using the public API.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api_base: DEFAULT_GITHUB_API.to_string(),
            token: None,
        }
    }

    /// Use a different API base (GitHub Enterprise, tests).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Authenticate with a token.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// API endpoint for a listing URL.
    ///
    /// # Errors
    ///
    /// `UnsupportedSource` for URLs that are neither API URLs nor GitHub
    /// repository URLs.
    pub fn endpoint(&self, url: &str) -> Result<String, FetchError> {
        if url.starts_with(&self.api_base) {
            return Ok(url.to_string());
        }
        GitHubRepo::from_url(url)
            .map(|repo| repo.releases_url(&self.api_base))
            .ok_or_else(|| FetchError::UnsupportedSource(url.to_string()))
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleases {
    async fn fetch(&self, url: &str) -> Result<Vec<Release>, FetchError> {
        let endpoint = self.endpoint(url)?;
        debug!("GET {endpoint}");

        let mut request = self
            .client
            .get(&endpoint)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fetch_error(&endpoint, &e))?
            .json::<Vec<Release>>()
            .await
            .map_err(|e| fetch_error(&endpoint, &e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    #[tokio::test]
    async fn test_fetch_releases_from_download_url() {
        let mut server = Server::new_async().await;
        let mock_body = r#"[
            {"tag_name": "v1.0.0", "draft": false, "prerelease": false, "assets": []},
            {"tag_name": "v1.0.0-rc.1", "draft": false, "prerelease": true, "assets": []},
            {"tag_name": "v0.9.0", "draft": true, "prerelease": false, "assets": []}
        ]"#;

        let m = server
            .mock("GET", "/repos/opencloud-eu/desktop/releases")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(mock_body)
            .create_async()
            .await;

        let source = GitHubReleases::new(Client::new())
            .with_api_base(server.url())
            .with_token(Some("secret".to_string()));
        let releases = source
            .fetch("https://github.com/opencloud-eu/desktop/releases/download/v1.0.0/x.pkg")
            .await
            .unwrap();

        m.assert_async().await;
        assert_eq!(releases.len(), 3);
        assert_eq!(releases[1].tag, "v1.0.0-rc.1");
        assert!(releases[1].prerelease);
        assert!(releases[2].draft);
    }

    #[tokio::test]
    async fn test_malformed_listing_is_decode_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/a/b/releases")
            .with_status(200)
            .with_body("{\"message\": \"not a list\"}")
            .create_async()
            .await;

        let source = GitHubReleases::new(Client::new()).with_api_base(server.url());
        let err = source.fetch("https://github.com/a/b").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn test_unsupported_source() {
        let source = GitHubReleases::new(Client::new());
        assert!(matches!(
            source.endpoint("https://example.com/app.pkg"),
            Err(FetchError::UnsupportedSource(_))
        ));
        assert_eq!(
            source.endpoint("https://api.github.com/repos/a/b/releases").unwrap(),
            "https://api.github.com/repos/a/b/releases"
        );
    }
}
