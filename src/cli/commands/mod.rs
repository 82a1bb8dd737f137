//! CLI command implementations

pub mod assign;
pub mod catalog;
pub mod completions;
pub mod derive;
pub mod init;
pub mod link;
pub mod status;
pub mod template;
pub mod version;
