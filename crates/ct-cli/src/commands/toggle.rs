//! Implementation of the `ct toggle` command.

use anyhow::Result;
use ct_store::AttendanceStore;

/// Submits a check-in toggle for the given id.
pub fn run(store: &AttendanceStore, id: u64) -> Result<()> {
    let checked_in = store.accept(id)?;
    if checked_in {
        println!("id {id} checked in");
    } else {
        println!("id {id} checked out");
    }
    Ok(())
}
