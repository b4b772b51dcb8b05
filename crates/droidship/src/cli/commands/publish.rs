//! Publish command - Publish an existing build to F-Droid

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tracing::info;

use droidship_fdroid::PublishReport;
use droidship_gradle::read_build_manifest;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat, PipelineOverrides};
use crate::pipeline::Pipeline;

/// Publish the artifacts of a previous build without rebuilding
#[derive(Debug, Args)]
pub struct PublishCommand {
    #[command(flatten)]
    pub overrides: PipelineOverrides,

    /// Gradle output-metadata.json to publish (defaults to the flavor's release output)
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

impl PublishCommand {
    /// Execute the publish command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let (config, _) = cli.load_config(&self.overrides)?;
        let pipeline = Pipeline::new(cli.project_root()?, config);

        let manifest = match &self.manifest {
            Some(path) => std::env::current_dir()?.join(path),
            None => pipeline
                .builder()
                .manifest_path(&pipeline.config().build.flavor),
        };
        info!(manifest = %manifest.display(), "executing publish command");

        let build = read_build_manifest(&manifest)
            .with_context(|| format!("reading build output {}", manifest.display()))?;

        let store = pipeline.credential_store()?;
        let credentials = store.credentials(&pipeline.config().fdroid.credentials)?;

        if cli.text_output() {
            output::info(&format!(
                "Publishing {} (version code {})",
                build.package_identifier, build.max_version_code
            ));
        }

        let report = pipeline.publish(&build, &credentials)?;

        match cli.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text if !cli.quiet => print_publish_report(&report),
            OutputFormat::Text => {}
        }

        Ok(())
    }
}

/// Print a publish report for humans
pub(crate) fn print_publish_report(report: &PublishReport) {
    println!();
    output::success("Published to F-Droid repository");
    for path in &report.copied {
        println!("{}", output::path_item(path));
    }
    for path in &report.skipped {
        output::warning(&format!("Skipped universal apk {}", path.display()));
    }
    println!(
        "{}",
        output::field("CurrentVersionCode", output::version_code(report.version_code))
    );
    println!("{}", output::field("Metadata", report.metadata.display()));
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_publish_manifest() {
        let cli = Cli::try_parse_from([
            "droidship",
            "publish",
            "--manifest",
            "out/output-metadata.json",
        ])
        .unwrap();
        let Commands::Publish(cmd) = cli.command else {
            panic!("expected publish command");
        };
        assert_eq!(cmd.manifest, Some(PathBuf::from("out/output-metadata.json")));
    }
}
