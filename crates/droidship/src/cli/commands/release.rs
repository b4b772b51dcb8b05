//! Release command - Build the store flavor and publish to F-Droid

use clap::Args;
use console::style;
use tracing::info;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat, PipelineOverrides};
use crate::pipeline::Pipeline;

use super::build::print_build_result;
use super::publish::print_publish_report;

/// Build, then publish to the F-Droid repository
#[derive(Debug, Args)]
pub struct ReleaseCommand {
    #[command(flatten)]
    pub overrides: PipelineOverrides,
}

impl ReleaseCommand {
    /// Execute the release command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let (config, config_path) = cli.load_config(&self.overrides)?;
        let pipeline = Pipeline::new(cli.project_root()?, config);
        info!(
            flavor = %pipeline.config().build.flavor,
            config = ?config_path,
            "executing release command"
        );

        if cli.text_output() {
            println!("{}", style("Releasing...").bold());
            println!("{}", output::field("Project", pipeline.project_root().display()));
            println!("{}", output::field("Flavor", &pipeline.config().build.flavor));
            if let Some(workspace) = pipeline.workspace() {
                println!("{}", output::field("F-Droid workspace", workspace.display()));
            }
            println!();
        }

        let outcome = pipeline.run()?;

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
            OutputFormat::Text if !cli.quiet => {
                print_build_result(&outcome.build);
                print_publish_report(&outcome.published);
            }
            OutputFormat::Text => {}
        }

        Ok(())
    }
}
