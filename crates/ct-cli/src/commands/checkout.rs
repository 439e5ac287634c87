//! Implementation of the `ct checkout-all` command.

use ct_store::AttendanceStore;

/// End-of-activity sweep: checks out everyone still checked in.
pub fn run(store: &AttendanceStore) {
    store.check_out_all();
    println!("checked out all remaining attendees");
}
