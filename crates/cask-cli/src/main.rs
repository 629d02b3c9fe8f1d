//! cask - macOS application casks CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cask_cli::cmd;
use cask_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (dry_run, quiet) = (cli.dry_run, cli.quiet);

    match cli.command {
        Commands::Info { cask } => cmd::info::info(&cask),
        Commands::Fetch { cask, arch } => {
            cmd::fetch::fetch(&cask, arch.as_deref(), dry_run, quiet).await
        }
        Commands::Install {
            cask,
            arch,
            artifact,
        } => {
            cmd::install::install(&cask, arch.as_deref(), artifact.as_deref(), dry_run, quiet)
                .await
        }
        Commands::Uninstall { cask, zap } => {
            cmd::uninstall::uninstall(&cask, zap, dry_run, quiet).await
        }
        Commands::Zap { cask } => cmd::zap::zap(&cask, dry_run, quiet).await,
        Commands::Livecheck { cask } => cmd::livecheck::livecheck(&cask).await,
        Commands::List => cmd::list::list(),
        Commands::Hash { files } => cmd::hash::hash(&files),
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
