//! Livecheck matching strategies.
//!
//! A strategy turns a release tag into a version (via a [`TagMatcher`]) and
//! decides which releases may count as the latest (via [`ReleaseFilter`]s).
//! Named strategies are resolved through a [`StrategyRegistry`], which ships
//! `github_releases` and `github_latest` and accepts additional factories.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use regex::{Regex, RegexBuilder};

use crate::error::LivecheckError;
use crate::livecheck::Release;
use crate::package::LivecheckConfig;

/// Pattern used when a cask names a strategy but no regex.
pub const DEFAULT_TAG_PATTERN: &str = r"^v?(\d+(?:\.\d+)+)$";

/// Strategy used when a cask names none.
pub const DEFAULT_STRATEGY: &str = "github_releases";

/// Extracts a version string from a release tag.
pub trait TagMatcher: Send + Sync + fmt::Debug {
    /// The version encoded in `tag`, or `None` if the tag does not match.
    fn extract(&self, tag: &str) -> Option<String>;
}

/// Case-insensitive regex; the first capture group (or the whole match when
/// the pattern has no groups) is the version.
#[derive(Debug, Clone)]
pub struct RegexCapture(Regex);

impl RegexCapture {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the regex compile error.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Self)
    }
}

impl TagMatcher for RegexCapture {
    fn extract(&self, tag: &str) -> Option<String> {
        let caps = self.0.captures(tag)?;
        caps.get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Uses the tag verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagAsIs;

impl TagMatcher for TagAsIs {
    fn extract(&self, tag: &str) -> Option<String> {
        let tag = tag.trim();
        (!tag.is_empty()).then(|| tag.to_string())
    }
}

/// Predicate deciding whether a release may be a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseFilter {
    /// Reject releases flagged as drafts.
    ExcludeDrafts,
    /// Reject releases flagged as pre-releases.
    ExcludePrereleases,
}

impl ReleaseFilter {
    /// Whether `release` passes this filter.
    pub fn admits(self, release: &Release) -> bool {
        match self {
            Self::ExcludeDrafts => !release.draft,
            Self::ExcludePrereleases => !release.prerelease,
        }
    }
}

/// A tag matcher composed with release filters.
#[derive(Debug, Clone)]
pub struct MatchStrategy {
    name: String,
    matcher: Arc<dyn TagMatcher>,
    filters: Vec<ReleaseFilter>,
}

impl MatchStrategy {
    /// Strategy that always excludes drafts.
    pub fn new(name: impl Into<String>, matcher: Arc<dyn TagMatcher>) -> Self {
        Self {
            name: name.into(),
            matcher,
            filters: vec![ReleaseFilter::ExcludeDrafts],
        }
    }

    /// Regex-capture strategy.
    ///
    /// # Errors
    ///
    /// `InvalidStrategy` if the pattern does not compile.
    pub fn regex(name: impl Into<String>, pattern: &str) -> Result<Self, LivecheckError> {
        let matcher =
            RegexCapture::new(pattern).map_err(|e| LivecheckError::InvalidStrategy(e.to_string()))?;
        Ok(Self::new(name, Arc::new(matcher)))
    }

    /// Add a filter.
    #[must_use]
    pub fn with_filter(mut self, filter: ReleaseFilter) -> Self {
        if !self.filters.contains(&filter) {
            self.filters.push(filter);
        }
        self
    }

    /// Strategy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version encoded in `tag`.
    pub fn extract(&self, tag: &str) -> Option<String> {
        self.matcher.extract(tag)
    }

    /// Whether `release` passes every filter.
    pub fn admits(&self, release: &Release) -> bool {
        self.filters.iter().all(|f| f.admits(release))
    }
}

/// Builds a strategy from an optional cask regex.
pub type StrategyFactory =
    Arc<dyn Fn(Option<&str>) -> Result<MatchStrategy, LivecheckError> + Send + Sync>;

/// Named strategies.
#[derive(Clone)]
pub struct StrategyRegistry {
    factories: BTreeMap<String, StrategyFactory>,
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("names", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        let mut registry = Self {
            factories: BTreeMap::new(),
        };
        registry.register("github_releases", |regex| {
            MatchStrategy::regex("github_releases", regex.unwrap_or(DEFAULT_TAG_PATTERN))
        });
        registry.register("github_latest", |regex| {
            Ok(
                MatchStrategy::regex("github_latest", regex.unwrap_or(DEFAULT_TAG_PATTERN))?
                    .with_filter(ReleaseFilter::ExcludePrereleases),
            )
        });
        registry.register("tag", |regex| match regex {
            Some(pattern) => MatchStrategy::regex("tag", pattern),
            None => Ok(MatchStrategy::new("tag", Arc::new(TagAsIs))),
        });
        registry
    }
}

impl StrategyRegistry {
    /// Registry with the built-in strategies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a named strategy.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(Option<&str>) -> Result<MatchStrategy, LivecheckError> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    /// Registered strategy names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build the strategy named `name`.
    ///
    /// # Errors
    ///
    /// `InvalidStrategy` for an unknown name or a bad pattern.
    pub fn build(&self, name: &str, regex: Option<&str>) -> Result<MatchStrategy, LivecheckError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| LivecheckError::InvalidStrategy(format!("unknown strategy '{name}'")))?;
        factory(regex)
    }

    /// Build the strategy a cask's `[livecheck]` table asks for.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn resolve(&self, config: &LivecheckConfig) -> Result<MatchStrategy, LivecheckError> {
        self.build(
            config.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY),
            config.regex.as_deref(),
        )
    }
}
