//! Store construction shared by all subcommands.
//!
//! Each invocation is its own process, so the composition root here
//! builds the store, hydrates it from the configured data directory,
//! and writes it back after mutating commands.

use std::fs;

use anyhow::{Context, Result};
use ct_store::{AttendanceStore, DB_FILE_NAME};

use crate::config::Config;

/// Builds a store and loads the database file if one exists.
pub fn open_store(config: &Config) -> Result<AttendanceStore> {
    fs::create_dir_all(&config.database_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.database_dir.display()
        )
    })?;

    let store = AttendanceStore::new();
    if config.database_dir.join(DB_FILE_NAME).exists() {
        store
            .load(&config.database_dir)
            .with_context(|| format!("failed to load database from {}", config.database_dir.display()))?;
    } else {
        tracing::debug!(
            dir = %config.database_dir.display(),
            "no database file yet, starting empty"
        );
    }
    Ok(store)
}

/// Writes the store back to the configured data directory.
pub fn persist(store: &AttendanceStore, config: &Config) -> Result<()> {
    store
        .dump(&config.database_dir)
        .with_context(|| format!("failed to write database to {}", config.database_dir.display()))
}
