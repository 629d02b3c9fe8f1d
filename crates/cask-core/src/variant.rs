//! Architecture variant selection.

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;
use crate::package::Cask;
use crate::paths::filename_from_url;
use crate::types::{Sha256Digest, Version};

/// One architecture-specific download target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Manifest tag (`arm`, `intel`); filled from the table key on load.
    #[serde(skip)]
    pub tag: String,
    /// URL template; `{{version}}` and `{{arch}}` are substituted.
    pub url: String,
    /// Expected SHA-256 of the artifact.
    pub sha256: Sha256Digest,
}

impl Variant {
    /// Render this variant's URL template.
    pub fn render_url(&self, version: &Version, arch: &str) -> String {
        render_template(&self.url, version, arch)
    }
}

/// Substitute `{{version}}` and `{{arch}}` in a template.
pub fn render_template(template: &str, version: &Version, arch: &str) -> String {
    template
        .replace("{{version}}", version.as_str())
        .replace("{{arch}}", arch)
}

/// Pick the variant whose tag equals `host_tag` exactly.
///
/// # Errors
///
/// `UnsupportedArchitecture` (carrying the sorted supported tags) when the
/// tag is empty or the cask has no matching variant.
pub fn select_variant<'a>(cask: &'a Cask, host_tag: &str) -> Result<&'a Variant, LifecycleError> {
    cask.variants
        .get(host_tag)
        .filter(|_| !host_tag.is_empty())
        .ok_or_else(|| LifecycleError::UnsupportedArchitecture {
            requested: host_tag.to_string(),
            supported: cask.supported_tags(),
        })
}

/// A variant resolved against its cask's version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDownload {
    /// Concrete download URL.
    pub url: String,
    /// Last path segment of the URL.
    pub file_name: String,
    /// Expected digest.
    pub sha256: Sha256Digest,
}

impl ResolvedDownload {
    /// Resolve `variant` for `cask`.
    pub fn new(cask: &Cask, variant: &Variant) -> Self {
        let url = cask.download_url(variant);
        let file_name = filename_from_url(&url).to_string();
        Self {
            url,
            file_name,
            sha256: variant.sha256.clone(),
        }
    }

    /// Cache file name: `<sha256>--<file>`.
    pub fn cache_key(&self) -> String {
        format!("{}--{}", self.sha256, self.file_name)
    }
}
