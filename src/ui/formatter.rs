//! Output formatting.
//!
//! stdout carries only the version string; everything else goes to stderr.

use console::style;

/// Format an error line as `Error: <message>`.
pub fn format_error(message: &str) -> String {
    format!("{} {}", style("Error:").red().bold(), message)
}

/// Print an error line to stderr.
pub fn display_error(message: &str) {
    eprintln!("{}", format_error(message));
}

/// Print a message to stderr without decoration.
pub fn display_plain_error(message: &str) {
    eprintln!("{}", message);
}

/// Print the resulting version to stdout.
pub fn display_version(version: &semver::Version) {
    println!("{}", version);
}
