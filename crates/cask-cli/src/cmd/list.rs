use anyhow::Result;
use cask_core::host::InstallStore;

use super::open_store;
use crate::ui::table;

/// List installed casks
pub fn list() -> Result<()> {
    let records = open_store()?.list()?;

    if records.is_empty() {
        println!();
        println!("  No casks installed.");
        println!("  Run 'cask install <cask>' to get started.");
        return Ok(());
    }

    println!();
    println!("{}", table::installed(&records));
    println!();
    println!("  {} casks", records.len());
    Ok(())
}
