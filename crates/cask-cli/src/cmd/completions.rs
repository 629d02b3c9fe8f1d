use clap::CommandFactory;
use clap_complete::generate;

/// Write shell completions for `cask` to stdout.
pub fn completions(shell: clap_complete::Shell) {
    let mut cmd = crate::Cli::command();
    generate(shell, &mut cmd, "cask", &mut std::io::stdout());
}
