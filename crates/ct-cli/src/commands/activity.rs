//! Implementation of the `ct activity` subcommands.

use anyhow::{Context, Result};
use chrono::DateTime;
use ct_core::CheckInActivity;
use ct_store::AttendanceStore;

/// Sets the current activity from RFC 3339 start/end times.
pub fn set(store: &AttendanceStore, name: &str, start: &str, end: &str) -> Result<()> {
    let start_time = parse_instant(start).context("invalid --start time")?;
    let end_time = parse_instant(end).context("invalid --end time")?;
    store.set_activity(Some(CheckInActivity::new(name, start_time, end_time)));
    println!("activity set to {name}");
    Ok(())
}

/// Prints the current activity, if any.
pub fn show(store: &AttendanceStore) {
    match store.activity() {
        Some(activity) => println!("{}", activity.render()),
        None => println!("no activity set"),
    }
}

/// Clears the current activity.
pub fn clear(store: &AttendanceStore) {
    store.set_activity(None);
    println!("activity cleared");
}

fn parse_instant(s: &str) -> Result<i64> {
    let dt = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("could not parse {s} as RFC 3339"))?;
    Ok(dt.timestamp_millis())
}
