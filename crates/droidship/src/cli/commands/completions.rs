//! Completions command - Shell completion scripts for droidship

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, CommandFactory};
use clap_complete::{generate, generate_to, Shell};
use tracing::info;

use crate::cli::{output, Cli};

const BIN_NAME: &str = "droidship";

/// Print or install a completion script
#[derive(Debug, Args)]
pub struct CompletionsCommand {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script into this directory instead of stdout
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

impl CompletionsCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(shell = %self.shell, "executing completions command");
        let mut cmd = Cli::command();

        let Some(dir) = &self.dir else {
            generate(self.shell, &mut cmd, BIN_NAME, &mut std::io::stdout());
            return Ok(());
        };

        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        let path = generate_to(self.shell, &mut cmd, BIN_NAME, dir)
            .with_context(|| format!("writing {} completions to {}", self.shell, dir.display()))?;

        if cli.text_output() {
            output::success(&format!("Completions written to {}", path.display()));
        }
        Ok(())
    }
}
