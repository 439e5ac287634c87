//! Core domain types for the check-in tracker.
//!
//! This crate contains the entities the attendance store operates on:
//! - [`Person`]: an immutable identity record
//! - [`CheckInActivity`]: the named, time-bounded event being tracked
//! - [`CheckInEvent`]: a single timestamped check-in/check-out transition
//! - [`AttendanceRecord`]: a person paired with their full event history

pub mod activity;
pub mod event;
pub mod person;
pub mod record;
mod time;

pub use activity::CheckInActivity;
pub use event::{CheckInEvent, Status};
pub use person::Person;
pub use record::AttendanceRecord;
pub use time::{Timestamp, format_timestamp, now_millis};
