//! Fetch command, plus the cancellable download shared with `install`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cask_core::io::client;
use cask_core::io::download::HttpFetcher;
use cask_core::variant::ResolvedDownload;
use cask_core::{Cask, EngineConfig, Lifecycle, Reporter, Variant, cache_path, select_variant};
use tracing::warn;

use super::system_context;
use crate::ui::Output;
use crate::{host_tag, resolve_cask};

/// Cache location for a variant's installer.
pub(crate) fn cache_dest(cask: &Cask, variant: &Variant) -> (ResolvedDownload, PathBuf) {
    let download = ResolvedDownload::new(cask, variant);
    let dest = cache_path().join(download.cache_key());
    (download, dest)
}

/// Download and verify `variant` into the cache.
///
/// Ctrl-C cancels the download; once it has finished the handler does
/// nothing, so later phases run to completion.
pub(crate) async fn download(
    lifecycle: &mut Lifecycle<'_>,
    variant: &Variant,
    dest: &Path,
    config: &EngineConfig,
) -> Result<PathBuf> {
    let fetcher = HttpFetcher::new(client(config.fetch_timeout)?);

    let cancel = lifecycle.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            match cancel.cancel() {
                Ok(true) => warn!("Download cancelled by user"),
                Ok(false) => {}
                Err(e) => warn!("{e}"),
            }
        }
    });

    let result = lifecycle.acquire(&fetcher, variant, dest).await;
    ctrl_c.abort();
    Ok(result?)
}

/// Download and verify a cask's installer without installing it.
pub async fn fetch(cask_arg: &str, arch: Option<&str>, dry_run: bool, quiet: bool) -> Result<()> {
    let (cask, _) = resolve_cask(cask_arg)?;
    let config = EngineConfig::from_env();
    let variant = select_variant(&cask, &host_tag(&config, arch))?;
    let (resolved, dest) = cache_dest(&cask, variant);

    if dry_run {
        println!("Would download {}", resolved.url);
        println!("          to {}", dest.display());
        return Ok(());
    }

    let output = Output::new(quiet);
    let mut lifecycle = Lifecycle::new(&cask, system_context(&config, &output)?);

    output.section("Fetching");
    let result = download(&mut lifecycle, variant, &dest, &config).await;
    if result.is_ok() {
        output.done(cask.name(), cask.version(), "verified", None);
    }
    output.flush().await;

    let path = result.with_context(|| format!("Failed to fetch {}", resolved.url))?;
    println!("{}", path.display());
    Ok(())
}
