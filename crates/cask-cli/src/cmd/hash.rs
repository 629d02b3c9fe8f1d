use std::path::PathBuf;

use anyhow::{Context, Result};
use cask_core::verify::sha256_file;

/// Print the SHA-256 of each file, in `sha256sum` layout.
pub fn hash(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let digest =
            sha256_file(file).with_context(|| format!("Failed to hash {}", file.display()))?;
        println!("{digest}  {}", file.display());
    }
    Ok(())
}
