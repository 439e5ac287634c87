//! Implementation of the `ct roster` command.

use anyhow::{Context, Result};
use ct_core::format_timestamp;
use ct_store::AttendanceStore;

/// Lists the roster sorted by name.
pub fn run(store: &AttendanceStore, json: bool) -> Result<()> {
    let records = store.sorted_attendance_records();
    if json {
        let out = serde_json::to_string_pretty(&records).context("failed to serialize roster")?;
        println!("{out}");
        return Ok(());
    }

    for record in &records {
        let person = record.person();
        let event = record.last_event();
        println!(
            "{}, {} (id {}): {} since {} ({} events)",
            person.last_name,
            person.first_name,
            person.id,
            event.status,
            format_timestamp(event.timestamp),
            record.events().len()
        );
    }
    Ok(())
}
