//! User interface module.

pub mod formatter;

pub use formatter::{display_error, display_plain_error, display_version, format_error};
