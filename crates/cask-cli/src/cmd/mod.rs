//! One module per subcommand.

pub mod completions;
pub mod fetch;
pub mod hash;
pub mod info;
pub mod install;
pub mod livecheck;
pub mod list;
pub mod uninstall;
pub mod zap;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use cask_core::{Context, EngineConfig};

use crate::store::SqliteStore;
use crate::ui::Output;

/// Open the install store.
pub(crate) fn open_store() -> Result<SqliteStore> {
    SqliteStore::open().context("Failed to open state database")
}

/// Lifecycle context backed by the system tools, the state database and the
/// terminal.
pub(crate) fn system_context(config: &EngineConfig, output: &Output) -> Result<Context> {
    let store = open_store()?;
    Ok(Context::system(
        config,
        Arc::new(store),
        Arc::new(output.clone()),
    ))
}
