//! Domain logic - pure version rules independent of files and git

pub mod tag;
pub mod version;

pub use tag::TagPattern;
pub use version::{clean, increment, parse, VersionBump};
