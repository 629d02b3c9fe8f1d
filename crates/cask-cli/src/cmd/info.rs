//! Info command

use anyhow::Result;
use cask_core::host::InstallStore;
use cask_core::livecheck::listing_url;
use crossterm::style::Stylize;

use super::open_store;
use crate::resolve_cask;

const LW: usize = 12;

fn field(label: &str, value: &str) {
    println!("  {label:<LW$}{value}");
}

fn list(label: &str, values: &[String]) {
    for (i, value) in values.iter().enumerate() {
        field(if i == 0 { label } else { "" }, value);
    }
}

/// Show a cask's definition and whether it is installed.
pub fn info(cask_arg: &str) -> Result<()> {
    let (cask, path) = resolve_cask(cask_arg)?;
    let installed = open_store()?.get(cask.name())?;

    println!();
    println!(
        "  {} {}",
        cask.name().as_str().white().bold(),
        cask.version().as_str().dark_grey()
    );
    if !cask.cask.name.is_empty() {
        println!("  {}", cask.cask.name);
    }
    if !cask.cask.desc.is_empty() {
        println!("  {}", cask.cask.desc);
    }
    println!();

    if !cask.cask.homepage.is_empty() {
        field("homepage", &cask.cask.homepage);
    }
    field("manifest", &path.display().to_string());
    if let Some(macos) = cask.depends_on.macos {
        field("requires", &format!("macOS {macos}"));
    }
    if cask.cask.auto_updates {
        field("updates", "automatic");
    }

    for (tag, variant) in &cask.variants {
        field(tag, &cask.download_url(variant));
        field("", &variant.sha256.as_str().dark_grey().to_string());
    }

    list("pkgutil", &cask.uninstall.pkgutil);
    list("zap", &cask.zap.trash);

    if let Some(lc) = &cask.livecheck {
        let strategy = lc
            .strategy
            .as_deref()
            .unwrap_or(cask_core::strategies::DEFAULT_STRATEGY);
        let url = listing_url(&cask).unwrap_or_default();
        field("livecheck", &format!("{strategy} {url}"));
    }

    match installed {
        Some(rec) => {
            let dt = chrono::DateTime::from_timestamp(rec.installed_at, 0)
                .unwrap_or_default()
                .format("%Y-%m-%d")
                .to_string();
            field(
                "installed",
                &format!("{} ({}), {dt}", rec.version, rec.arch),
            );
        }
        None => field("installed", "no"),
    }

    Ok(())
}
