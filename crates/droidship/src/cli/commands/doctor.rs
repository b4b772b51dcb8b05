//! Doctor command - check configuration, credentials and tools before a release

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::info;

use droidship_core::{AndroidSdk, Config, CredentialStore, ToolRunner};

use crate::cli::{Cli, OutputFormat, PipelineOverrides};
use crate::pipeline::Pipeline;

/// Check that a release can run in this project
#[derive(Debug, Args)]
pub struct DoctorCommand {
    /// Show suggestions for fixing issues
    #[arg(long)]
    pub fix: bool,

    #[command(flatten)]
    pub overrides: PipelineOverrides,
}

/// Result of a single check
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: Option<String>,
    pub fix_suggestion: Option<String>,
}

impl CheckResult {
    fn ok(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: Some(message.into()),
            fix_suggestion: None,
        }
    }

    fn skipped(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Skip,
            message: Some(message.into()),
            fix_suggestion: None,
        }
    }

    fn with_status(
        name: &str,
        status: CheckStatus,
        message: impl Into<String>,
        fix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: Some(message.into()),
            fix_suggestion: Some(fix.into()),
        }
    }
}

/// Status of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warn,
    Fail,
    Skip,
}

/// Summary of all checks
#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub checks: Vec<CheckResult>,
    pub ok_count: usize,
    pub warn_count: usize,
    pub fail_count: usize,
    pub skip_count: usize,
}

impl DoctorSummary {
    fn new(checks: Vec<CheckResult>) -> Self {
        let count = |status| checks.iter().filter(|c| c.status == status).count();
        Self {
            ok_count: count(CheckStatus::Ok),
            warn_count: count(CheckStatus::Warn),
            fail_count: count(CheckStatus::Fail),
            skip_count: count(CheckStatus::Skip),
            checks,
        }
    }
}

impl DoctorCommand {
    /// Execute the doctor command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(fix = self.fix, "executing doctor command");

        if cli.text_output() {
            println!("{}", style("Checking release setup...").bold());
            println!();
        }

        let project_root = cli.project_root()?;
        let mut checks = Vec::new();

        let config = match cli.load_config(&self.overrides) {
            Ok((config, Some(path))) => {
                checks.push(CheckResult::ok("Configuration", path.display().to_string()));
                config
            }
            Ok((config, None)) => {
                checks.push(CheckResult::with_status(
                    "Configuration",
                    CheckStatus::Warn,
                    "No droidship.toml found, using defaults",
                    "Create droidship.toml in the project root",
                ));
                config
            }
            Err(e) => {
                checks.push(CheckResult::with_status(
                    "Configuration",
                    CheckStatus::Fail,
                    format!("{:#}", e),
                    "Fix droidship.toml and run doctor again",
                ));
                Config::default()
            }
        };

        let pipeline = Pipeline::new(&project_root, config);
        checks.extend(check_credentials(&pipeline));
        checks.push(check_gradle(&pipeline));
        checks.push(check_android_sdk(&project_root));
        checks.push(check_index_tool(&pipeline.config().fdroid.command));
        checks.extend(check_workspace(pipeline.workspace()));

        let summary = DoctorSummary::new(checks);

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    print_results(&summary.checks);
                    print_summary(&summary);
                }

                if self.fix && !cli.quiet {
                    print_fixes(&summary.checks);
                }
            }
        }

        if summary.fail_count > 0 {
            anyhow::bail!("{} check(s) failed", summary.fail_count);
        }

        Ok(())
    }
}

/// Credentials file and both trust domains; secret values are never shown
fn check_credentials<R: ToolRunner>(pipeline: &Pipeline<R>) -> Vec<CheckResult> {
    let path = pipeline.credentials_path();
    let store = match CredentialStore::load(&path) {
        Ok(store) => store,
        Err(e) => {
            return vec![
                CheckResult::with_status(
                    "Credentials file",
                    CheckStatus::Fail,
                    e.to_string(),
                    format!(
                        "Create {} with [{}] and [{}] tables",
                        path.display(),
                        pipeline.config().build.credentials,
                        pipeline.config().fdroid.credentials
                    ),
                ),
                CheckResult::skipped("Build credentials", "Credentials file unavailable"),
                CheckResult::skipped("Repository credentials", "Credentials file unavailable"),
            ];
        }
    };

    let mut results = vec![CheckResult::ok(
        "Credentials file",
        store.path().display().to_string(),
    )];
    for (name, domain) in [
        ("Build credentials", &pipeline.config().build.credentials),
        ("Repository credentials", &pipeline.config().fdroid.credentials),
    ] {
        results.push(match store.credentials(domain) {
            Ok(set) => CheckResult::ok(name, format!("[{}] alias {}", domain, set.key_alias())),
            Err(e) => CheckResult::with_status(
                name,
                CheckStatus::Fail,
                e.to_string(),
                format!(
                    "Add keystore, keystore_password, key_alias and key_password under [{}]",
                    domain
                ),
            ),
        });
    }
    results
}

fn check_gradle<R: ToolRunner>(pipeline: &Pipeline<R>) -> CheckResult {
    let program = pipeline.builder().gradle_program();
    if program.is_absolute() {
        return CheckResult::ok("Gradle", format!("wrapper {}", program.display()));
    }
    match which::which(&program) {
        Ok(path) => CheckResult::with_status(
            "Gradle",
            CheckStatus::Warn,
            format!("No wrapper, using {}", path.display()),
            "Add the Gradle wrapper with 'gradle wrapper'",
        ),
        Err(_) => CheckResult::with_status(
            "Gradle",
            CheckStatus::Fail,
            "No gradlew in the project and gradle is not on PATH",
            "Add the Gradle wrapper or install Gradle",
        ),
    }
}

fn check_android_sdk(project_root: &Path) -> CheckResult {
    match AndroidSdk::locate(project_root) {
        Ok(sdk) => CheckResult::ok("Android SDK", sdk.root().display().to_string()),
        Err(e) => CheckResult::with_status(
            "Android SDK",
            CheckStatus::Fail,
            e.to_string(),
            "Set ANDROID_HOME or sdk.dir in local.properties",
        ),
    }
}

fn check_index_tool(command: &str) -> CheckResult {
    match which::which(command) {
        Ok(path) => CheckResult::ok("Index tool", path.display().to_string()),
        Err(_) => CheckResult::with_status(
            "Index tool",
            CheckStatus::Fail,
            format!("'{}' not found on PATH", command),
            "Install fdroidserver or set [fdroid] command in droidship.toml",
        ),
    }
}

fn check_workspace(workspace: Option<PathBuf>) -> Vec<CheckResult> {
    let Some(workspace) = workspace else {
        return vec![CheckResult::with_status(
            "F-Droid workspace",
            CheckStatus::Warn,
            "Not configured; publishing is unavailable",
            "Set [fdroid] workspace in droidship.toml or pass --workspace",
        )];
    };

    if !workspace.is_dir() {
        return vec![CheckResult::with_status(
            "F-Droid workspace",
            CheckStatus::Fail,
            format!("{} does not exist", workspace.display()),
            "Create the repository with 'fdroid init'",
        )];
    }

    let mut results = vec![CheckResult::ok(
        "F-Droid workspace",
        workspace.display().to_string(),
    )];
    for dir in ["repo", "metadata"] {
        let path = workspace.join(dir);
        let name = format!("Workspace {}/", dir);
        results.push(if path.is_dir() {
            CheckResult::ok(&name, path.display().to_string())
        } else {
            CheckResult::with_status(
                &name,
                CheckStatus::Fail,
                format!("{} is missing", path.display()),
                format!("Create {}", path.display()),
            )
        });
    }
    results
}

fn print_results(checks: &[CheckResult]) {
    for check in checks {
        let icon = status_icon(check.status);
        let msg = check.message.as_deref().unwrap_or("");
        let name = match check.status {
            CheckStatus::Ok => style(&check.name).green(),
            CheckStatus::Warn => style(&check.name).yellow(),
            CheckStatus::Fail => style(&check.name).red(),
            CheckStatus::Skip => style(&check.name).dim(),
        };
        println!("  {} {} {}", icon, name, style(msg).dim());
    }
}

fn print_summary(summary: &DoctorSummary) {
    println!();
    let total = summary.ok_count + summary.warn_count + summary.fail_count + summary.skip_count;

    if summary.fail_count == 0 && summary.warn_count == 0 {
        println!(
            "{} All {} checks passed!",
            style("✓").green().bold(),
            summary.ok_count
        );
        return;
    }

    println!(
        "Summary: {} ok, {} warnings, {} failed, {} skipped (out of {})",
        style(summary.ok_count).green(),
        style(summary.warn_count).yellow(),
        style(summary.fail_count).red(),
        style(summary.skip_count).dim(),
        total
    );
}

fn print_fixes(checks: &[CheckResult]) {
    let fixes: Vec<_> = checks
        .iter()
        .filter(|c| matches!(c.status, CheckStatus::Warn | CheckStatus::Fail))
        .filter_map(|c| {
            c.fix_suggestion.as_deref().map(|fix| (&c.name, fix))
        })
        .collect();

    if fixes.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Suggested fixes:").bold());
    for (name, fix) in fixes {
        println!("  {} {}: {}", style("→").cyan(), name, fix);
    }
}

fn status_icon(status: CheckStatus) -> console::StyledObject<&'static str> {
    match status {
        CheckStatus::Ok => style("[OK]").green(),
        CheckStatus::Warn => style("[WARN]").yellow(),
        CheckStatus::Fail => style("[FAIL]").red(),
        CheckStatus::Skip => style("[SKIP]").dim(),
    }
}
