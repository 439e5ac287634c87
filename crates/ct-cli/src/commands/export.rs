//! Implementation of the `ct export-csv` command.

use std::path::Path;

use anyhow::{Context, Result};
use ct_store::AttendanceStore;

/// Writes the CSV export. The store requires the target to already
/// exist as a file, so the error message spells that out.
pub fn run(store: &AttendanceStore, path: &Path) -> Result<()> {
    store.dump_csv(path).with_context(|| {
        format!(
            "failed to export CSV to {} (the target must be an existing file)",
            path.display()
        )
    })?;
    println!("exported CSV to {}", path.display());
    Ok(())
}
