//! Implementation of the `ct status` command.

use ct_store::AttendanceStore;

/// Prints the activity header and each person's most recent event.
pub fn run(store: &AttendanceStore) {
    store.print();
}
