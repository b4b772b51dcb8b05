//! Terminal output helpers

use std::fmt::Display;
use std::path::Path;

use console::style;

/// Print a success line
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error to stderr
pub fn error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// `  Label: value` with a dimmed label
pub fn field(label: &str, value: impl Display) -> String {
    format!("  {}: {}", style(label).dim(), value)
}

/// Bold section title followed by a colon
pub fn section(title: &str) -> String {
    format!("{}:", style(title).bold())
}

/// Indented bullet naming a file
pub fn path_item(path: &Path) -> String {
    format!("  • {}", style(path.display()).cyan())
}

/// Highlighted version code
pub fn version_code(code: u64) -> String {
    style(code).green().bold().to_string()
}
