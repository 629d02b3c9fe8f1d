//! Uninstall command

use anyhow::{Context, Result};
use cask_core::{EngineConfig, Lifecycle, LifecycleOutcome, Reporter};

use super::{system_context, zap};
use crate::resolve_cask;
use crate::ui::Output;

/// Forget a cask's package receipts, optionally followed by zap.
pub async fn uninstall(cask_arg: &str, with_zap: bool, dry_run: bool, quiet: bool) -> Result<()> {
    let (cask, _) = resolve_cask(cask_arg)?;
    if dry_run {
        for id in &cask.uninstall.pkgutil {
            println!("Would forget {id}");
        }
        if with_zap {
            zap::plan(&cask);
        }
        return Ok(());
    }

    let config = EngineConfig::from_env();
    let output = Output::new(quiet);
    let mut lifecycle = Lifecycle::new(&cask, system_context(&config, &output)?);

    output.section("Uninstalling");
    let result = async {
        let outcome = lifecycle
            .uninstall()
            .await
            .with_context(|| format!("Failed to uninstall {}", cask.name()))?;
        if let LifecycleOutcome::Uninstalled { removed, absent } = outcome {
            output.success(&format!(
                "Uninstalled {}: {} receipts removed, {} not registered",
                cask.name(),
                removed.len(),
                absent.len()
            ));
        }
        if with_zap {
            zap::run(&mut lifecycle, &cask, &output).await?;
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;
    output.flush().await;
    result
}
