//! CLI subcommand implementations.

pub mod init;
pub mod run;
