//! Livecheck command

use anyhow::{Context, Result};
use cask_core::io::client;
use cask_core::io::github::GitHubReleases;
use cask_core::{EngineConfig, LivecheckError, StrategyRegistry, check_for_updates};
use crossterm::style::Stylize;

use crate::resolve_cask;
use crate::ui::table;

/// Query the cask's release listing and report whether a newer version
/// exists.
pub async fn livecheck(cask_arg: &str) -> Result<()> {
    let (cask, _) = resolve_cask(cask_arg)?;
    let Some(lc) = cask.livecheck.as_ref() else {
        return Err(LivecheckError::NotConfigured(cask.name().to_string()).into());
    };

    let config = EngineConfig::from_env();
    let strategy = StrategyRegistry::new().resolve(lc)?;
    let source = GitHubReleases::new(client(config.fetch_timeout)?)
        .with_api_base(config.github_api)
        .with_token(config.github_token);

    let result = check_for_updates(&cask, &source, &strategy)
        .await
        .with_context(|| format!("Livecheck failed for {}", cask.name()))?;
    let latest = result.latest().map(|v| v.as_str().to_string());

    println!();
    println!("{}", table::discovered(&result.entries, latest.as_deref()));
    println!();
    println!("  {:<10}{}", "current", result.current);
    println!("  {:<10}{}", "latest", latest.as_deref().unwrap_or("-"));
    if result.is_update_available() {
        println!("  {}", "update available".yellow().bold());
    } else {
        println!("  {}", "up to date".green());
    }
    Ok(())
}
