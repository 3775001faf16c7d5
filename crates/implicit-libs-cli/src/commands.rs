//! Subcommand implementations.

pub mod infer;
pub mod init;
pub mod list_types;
pub mod output;
pub mod sync_paths;
