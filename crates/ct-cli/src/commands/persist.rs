//! Implementation of the `ct dump` and `ct load` commands.
//!
//! Without an explicit directory these operate on the configured data
//! directory; with one they copy state out to, or merge state in from,
//! somewhere else (e.g., a backup or another machine's export).

use std::path::Path;

use anyhow::{Context, Result};
use ct_store::AttendanceStore;

pub fn dump(store: &AttendanceStore, dir: &Path) -> Result<()> {
    store
        .dump(dir)
        .with_context(|| format!("failed to dump database to {}", dir.display()))?;
    println!("dumped database to {}", dir.display());
    Ok(())
}

/// Merges records from `dir` into the store. Entries with the same id
/// are overwritten by the loaded ones.
pub fn load(store: &AttendanceStore, dir: &Path) -> Result<()> {
    store
        .load(dir)
        .with_context(|| format!("failed to load database from {}", dir.display()))?;
    println!("loaded database from {}", dir.display());
    Ok(())
}
