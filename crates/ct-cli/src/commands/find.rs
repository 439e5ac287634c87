//! Implementation of the `ct find` command.

use anyhow::{Result, bail};
use ct_store::AttendanceStore;

/// Looks up a person by name. When several people share a name, the
/// store returns an arbitrary one; the id printed here disambiguates.
pub fn run(store: &AttendanceStore, first: &str, last: &str) -> Result<()> {
    match store.find_person(first, last) {
        Some(person) => {
            println!("{} has id {}", person, person.id);
            Ok(())
        }
        None => bail!("no person named {first} {last}"),
    }
}
