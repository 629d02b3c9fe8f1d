//! Install command

use std::path::Path;

use anyhow::{Context, Result};
use cask_core::{
    EngineConfig, Lifecycle, LifecycleOutcome, Reporter, select_variant, verify_file,
};

use super::fetch::{cache_dest, download};
use super::system_context;
use crate::ui::Output;
use crate::{host_tag, resolve_cask};

/// Download (or take a local artifact), verify and install a cask.
pub async fn install(
    cask_arg: &str,
    arch: Option<&str>,
    artifact: Option<&Path>,
    dry_run: bool,
    quiet: bool,
) -> Result<()> {
    let (cask, _) = resolve_cask(cask_arg)?;
    let config = EngineConfig::from_env();
    let variant = select_variant(&cask, &host_tag(&config, arch))?;
    let (resolved, dest) = cache_dest(&cask, variant);

    if dry_run {
        match artifact {
            Some(path) => {
                verify_file(path, &variant.sha256)
                    .await
                    .with_context(|| format!("Failed to verify {}", path.display()))?;
                println!("Verified {}", path.display());
            }
            None => println!("Would download {}", resolved.url),
        }
        println!(
            "Would install {} {} ({}) onto {}",
            cask.name(),
            cask.version(),
            variant.tag,
            config.install_target.display()
        );
        return Ok(());
    }

    let output = Output::new(quiet);
    let mut lifecycle = Lifecycle::new(&cask, system_context(&config, &output)?);

    output.section("Installing");
    let result = async {
        let path = match artifact {
            Some(path) => {
                lifecycle.verify(variant, path).await?;
                path.to_path_buf()
            }
            None => download(&mut lifecycle, variant, &dest, &config).await?,
        };
        Ok::<_, anyhow::Error>(lifecycle.install(variant, &path).await?)
    }
    .await;

    match &result {
        Ok(LifecycleOutcome::AlreadyInstalled { version }) => {
            output.success(&format!("{} {version} is already installed", cask.name()));
        }
        Ok(_) => output.success(&format!("Installed {} {}", cask.name(), cask.version())),
        Err(_) => {}
    }
    output.flush().await;

    result
        .map(|_| ())
        .with_context(|| format!("Failed to install {}", cask.name()))
}
