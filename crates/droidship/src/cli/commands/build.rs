//! Build command - Build a signed store release

use clap::Args;
use console::style;
use tracing::info;

use droidship_core::BuildResult;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat, PipelineOverrides};
use crate::pipeline::Pipeline;

/// Build a signed release of the configured flavor
#[derive(Debug, Args)]
pub struct BuildCommand {
    #[command(flatten)]
    pub overrides: PipelineOverrides,
}

impl BuildCommand {
    /// Execute the build command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let (config, _) = cli.load_config(&self.overrides)?;
        let pipeline = Pipeline::new(cli.project_root()?, config);
        info!(flavor = %pipeline.config().build.flavor, "executing build command");

        let store = pipeline.credential_store()?;
        let credentials = store.credentials(&pipeline.config().build.credentials)?;

        if cli.text_output() {
            println!(
                "{} {} release...",
                style("Building").bold(),
                style(&pipeline.config().build.flavor).cyan()
            );
        }

        let result = pipeline.build(&credentials)?;

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            OutputFormat::Text if !cli.quiet => print_build_result(&result),
            OutputFormat::Text => {}
        }

        Ok(())
    }
}

/// Print a build result for humans
pub(crate) fn print_build_result(result: &BuildResult) {
    println!();
    output::success("Build completed successfully!");
    println!("{}", output::field("Package", &result.package_identifier));
    println!(
        "{}",
        output::field("Version code", output::version_code(result.max_version_code))
    );
    println!();
    println!("{}", output::section("Artifacts"));
    for artifact in &result.artifact_paths {
        println!("{}", output::path_item(artifact));
    }
}
