//! droidship - Android release build and F-Droid publishing CLI

mod cli;
mod exit_codes;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::{output, Cli};

/// Daily-rolled JSON log, under `~/.droidship/logs`
const LOG_FILE: &str = "droidship.log";

fn main() {
    let cli = Cli::parse();
    let guard = init_tracing(cli.verbose);

    if let Err(err) = cli.execute() {
        output::error(&format!("{:#}", err));
        let code = exit_codes::for_error(&err);
        // process::exit skips destructors; flush the log file first
        drop(guard);
        std::process::exit(code);
    }
}

/// Console logging on stderr, filtered by RUST_LOG (default `warn`, `info`
/// with --verbose), plus a debug-level JSON file when a log directory exists.
fn init_tracing(verbose: bool) -> Option<WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "info" } else { "warn" }));
    let console = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter);

    let (file, guard) = match log_directory() {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE));
            let layer = fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}

fn log_directory() -> Option<PathBuf> {
    let dir = dirs::home_dir()?.join(".droidship").join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
