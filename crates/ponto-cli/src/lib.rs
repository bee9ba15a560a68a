//! Ponto CLI library.
//!
//! This crate provides the console front end for the time clock.

mod cli;
pub mod commands;
mod config;
pub mod console;

use anyhow::{Context, Result};
use ponto_store::RecordStore;

pub use cli::{Cli, Commands};
pub use config::Config;

/// Opens (or creates) the record store named by `config`.
pub fn open_store(config: &Config) -> Result<RecordStore> {
    RecordStore::open_or_create(&config.store_path, config.stale_store).with_context(|| {
        format!(
            "failed to open record store {}",
            config.store_path.display()
        )
    })
}
