//! Update checks against an upstream release listing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LivecheckError;
use crate::host::ReleaseSource;
use crate::package::Cask;
use crate::strategies::MatchStrategy;
use crate::types::Version;

/// One entry of a release listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    /// Tag name (`v1.0.0-rc.1`).
    #[serde(rename = "tag_name", alias = "tag")]
    pub tag: String,
    /// Unpublished draft.
    #[serde(default)]
    pub draft: bool,
    /// Flagged as a pre-release by the publisher.
    #[serde(default)]
    pub prerelease: bool,
}

/// A version extracted from a release tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredVersion {
    /// Extracted version.
    pub version: Version,
    /// The release was a draft.
    pub draft: bool,
    /// The release passed every filter of the strategy.
    pub candidate: bool,
}

/// Lazily extract versions from `releases` in listing order.
///
/// Releases whose tag does not match are skipped. Each call starts over.
pub fn extract_versions<'r>(
    releases: &'r [Release],
    strategy: &'r MatchStrategy,
) -> impl Iterator<Item = DiscoveredVersion> + 'r {
    releases.iter().filter_map(move |release| {
        strategy.extract(&release.tag).map(|v| DiscoveredVersion {
            version: Version::from(v),
            draft: release.draft,
            candidate: strategy.admits(release),
        })
    })
}

/// Outcome of an update check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheckResult {
    /// Version declared by the cask.
    pub current: Version,
    /// Listing URL that was queried.
    pub url: String,
    /// Every matching release, in listing order.
    pub entries: Vec<DiscoveredVersion>,
}

impl UpdateCheckResult {
    /// Candidate versions (non-draft and admitted by the strategy), in
    /// listing order.
    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.entries
            .iter()
            .filter(|e| e.candidate)
            .map(|e| &e.version)
    }

    /// Highest candidate under semantic version ordering.
    pub fn latest(&self) -> Option<&Version> {
        self.versions().max_by(|a, b| a.cmp_semantic(b))
    }

    /// `true` when the latest candidate is newer than the cask's version.
    /// Semantically equal versions (`1.2` and `1.2.0`) are not an update.
    pub fn is_update_available(&self) -> bool {
        self.latest()
            .is_some_and(|latest| latest.cmp_semantic(&self.current) == Ordering::Greater)
    }
}

/// Listing URL for a cask: the configured one, or the rendered download URL
/// of its first variant when the configuration says `"url"` or is absent.
pub fn listing_url(cask: &Cask) -> Option<String> {
    match cask.livecheck.as_ref().and_then(|l| l.url.as_deref()) {
        Some(url) if url != "url" => Some(url.to_string()),
        _ => cask.variants.values().next().map(|v| cask.download_url(v)),
    }
}

/// Query `source` for releases of `cask` and extract versions with
/// `strategy`.
///
/// # Errors
///
/// `Fetch` if the listing cannot be retrieved, `NotConfigured` if the cask
/// has no URL to check, and `NoMatchingReleases` when no candidate matched.
pub async fn check_for_updates(
    cask: &Cask,
    source: &dyn ReleaseSource,
    strategy: &MatchStrategy,
) -> Result<UpdateCheckResult, LivecheckError> {
    let url =
        listing_url(cask).ok_or_else(|| LivecheckError::NotConfigured(cask.name().to_string()))?;
    debug!("livecheck {} via {} at {url}", cask.name(), strategy.name());

    let releases = source.fetch(&url).await?;
    let entries: Vec<_> = extract_versions(&releases, strategy).collect();
    debug!("{} of {} releases matched", entries.len(), releases.len());

    let result = UpdateCheckResult {
        current: cask.version().clone(),
        url,
        entries,
    };
    if result.latest().is_none() {
        return Err(LivecheckError::NoMatchingReleases { url: result.url });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::strategies::StrategyRegistry;
    use async_trait::async_trait;

    struct Listing(Vec<Release>);

    #[async_trait]
    impl ReleaseSource for Listing {
        async fn fetch(&self, _url: &str) -> Result<Vec<Release>, FetchError> {
            Ok(self.0.clone())
        }
    }

    struct Offline;

    #[async_trait]
    impl ReleaseSource for Offline {
        async fn fetch(&self, url: &str) -> Result<Vec<Release>, FetchError> {
            Err(FetchError::Timeout {
                url: url.to_string(),
            })
        }
    }

    fn release(tag: &str, draft: bool) -> Release {
        Release {
            tag: tag.to_string(),
            draft,
            prerelease: false,
        }
    }

    fn cask() -> Cask {
        Cask::parse(include_str!("../../../casks/opencloud.toml")).unwrap()
    }

    fn strategy(cask: &Cask) -> MatchStrategy {
        StrategyRegistry::new()
            .resolve(cask.livecheck.as_ref().unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn drafts_are_not_candidates() {
        let cask = cask();
        let source = Listing(vec![release("v1.0.0-rc.1", false), release("v0.9.0", true)]);
        let result = check_for_updates(&cask, &source, &strategy(&cask))
            .await
            .unwrap();

        let versions: Vec<_> = result.versions().map(Version::as_str).collect();
        assert_eq!(versions, vec!["1.0.0-rc.1"]);
        assert_eq!(result.entries.len(), 2);
        assert!(result.entries[1].draft);
        assert!(!result.is_update_available());
    }

    #[tokio::test]
    async fn release_is_newer_than_its_candidate() {
        let cask = cask();
        let source = Listing(vec![
            release("v1.0.0-rc.1", false),
            release("v1.0.0", false),
            release("v1.0.0-rc.2", false),
        ]);
        let result = check_for_updates(&cask, &source, &strategy(&cask))
            .await
            .unwrap();

        assert_eq!(result.latest().map(Version::as_str), Some("1.0.0"));
        assert!(result.is_update_available());
    }

    fn checked(current: &str, found: &[&str]) -> UpdateCheckResult {
        UpdateCheckResult {
            current: Version::from(current),
            url: String::new(),
            entries: found
                .iter()
                .map(|v| DiscoveredVersion {
                    version: Version::from(*v),
                    draft: false,
                    candidate: true,
                })
                .collect(),
        }
    }

    #[test]
    fn equal_versions_are_not_updates() {
        assert!(!checked("1.2", &["1.2.0"]).is_update_available());
        assert!(!checked("1.2.0", &["1.2"]).is_update_available());
        assert!(!checked("1.0.0+b1", &["1.0.0+b2"]).is_update_available());
        assert!(checked("1.2", &["1.2.0", "1.2.1"]).is_update_available());
    }

    #[test]
    fn derives_listing_url_from_download_url() {
        let cask = cask();
        assert_eq!(
            listing_url(&cask).as_deref(),
            Some(
                "https://github.com/opencloud-eu/desktop/releases/download/v1.0.0-rc.1/OpenCloud_Desktop-v1.0.0-rc.1-macos-clang-arm64.pkg"
            )
        );
    }

    #[tokio::test]
    async fn no_matching_releases() {
        let cask = cask();
        let source = Listing(vec![release("nightly", false), release("v2.0.0", true)]);
        let err = check_for_updates(&cask, &source, &strategy(&cask))
            .await
            .unwrap_err();
        assert!(matches!(err, LivecheckError::NoMatchingReleases { .. }));
    }

    #[tokio::test]
    async fn fetch_errors_surface() {
        let cask = cask();
        let err = check_for_updates(&cask, &Offline, &strategy(&cask))
            .await
            .unwrap_err();
        assert!(matches!(err, LivecheckError::Fetch(FetchError::Timeout { .. })));
    }

    #[test]
    fn extraction_is_restartable() {
        let releases = vec![release("v1.2.0", false), release("junk", false)];
        let strategy = StrategyRegistry::new().build("github_releases", None).unwrap();
        let mut first = extract_versions(&releases, &strategy);
        assert_eq!(first.next().map(|d| d.version), Some(Version::from("1.2.0")));
        assert_eq!(extract_versions(&releases, &strategy).count(), 1);
    }

    #[test]
    fn release_deserializes_github_json() {
        let json = r#"[{"tag_name":"v1.0.0","draft":false,"prerelease":true,"name":"x"}]"#;
        let releases: Vec<Release> = serde_json::from_str(json).unwrap();
        assert_eq!(releases[0].tag, "v1.0.0");
        assert!(releases[0].prerelease);
    }
}
