//! Implementation of the `ct add` command.

use anyhow::Result;
use ct_store::AttendanceStore;

/// Registers a person, under a fixed id when one is supplied.
pub fn run(store: &AttendanceStore, first: &str, last: &str, id: Option<u64>) -> Result<()> {
    let person = match id {
        Some(id) => store.add_user_with_id(id, first, last)?,
        None => store.add_user(first, last)?,
    };
    println!("added {} with id {}", person, person.id);
    Ok(())
}
