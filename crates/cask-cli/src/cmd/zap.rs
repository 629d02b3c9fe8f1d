//! Zap command

use anyhow::{Context, Result};
use cask_core::{Cask, EngineConfig, Lifecycle, LifecycleOutcome, Reporter, expand_home};

use super::system_context;
use crate::resolve_cask;
use crate::ui::Output;

/// Print the paths zap would remove.
pub(crate) fn plan(cask: &Cask) {
    for entry in &cask.zap.trash {
        println!("Would remove {}", expand_home(entry).display());
    }
}

/// Run zap on an executor and report the outcome.
pub(crate) async fn run(lifecycle: &mut Lifecycle<'_>, cask: &Cask, output: &Output) -> Result<()> {
    let outcome = lifecycle
        .zap()
        .await
        .with_context(|| format!("Failed to zap {}", cask.name()))?;
    if let LifecycleOutcome::Zapped { removed, absent } = outcome {
        output.success(&format!(
            "Zapped {}: {} removed, {} already gone",
            cask.name(),
            removed.len(),
            absent.len()
        ));
    }
    Ok(())
}

/// Remove a cask's residual files.
pub async fn zap(cask_arg: &str, dry_run: bool, quiet: bool) -> Result<()> {
    let (cask, _) = resolve_cask(cask_arg)?;
    if dry_run {
        plan(&cask);
        return Ok(());
    }

    let config = EngineConfig::from_env();
    let output = Output::new(quiet);
    let mut lifecycle = Lifecycle::new(&cask, system_context(&config, &output)?);

    output.section("Zapping");
    let result = run(&mut lifecycle, &cask, &output).await;
    output.flush().await;
    result
}
