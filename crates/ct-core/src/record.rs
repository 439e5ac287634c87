//! Per-person attendance history.

use serde::{Deserialize, Serialize};

use crate::activity::CheckInActivity;
use crate::event::{CheckInEvent, Status};
use crate::person::Person;
use crate::time::Timestamp;

/// A person paired with their ordered check-in history.
///
/// The event list is append-only and never empty: creation seeds a
/// `CheckedOut` event at timestamp 0 so that the first toggle always
/// lands on `CheckedIn`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    person: Person,
    events: Vec<CheckInEvent>,
}

impl AttendanceRecord {
    /// Creates a record seeded with the initial checked-out event,
    /// tagged with the activity current at creation time (if any).
    #[must_use]
    pub fn new(person: Person, activity: Option<CheckInActivity>) -> Self {
        Self {
            person,
            events: vec![CheckInEvent::new(activity, Status::CheckedOut, 0)],
        }
    }

    /// Rebuilds a record from persisted parts.
    ///
    /// Returns `None` when the event list is empty, which would violate
    /// the non-empty invariant every accessor here relies on.
    #[must_use]
    pub fn from_parts(person: Person, events: Vec<CheckInEvent>) -> Option<Self> {
        if events.is_empty() {
            return None;
        }
        Some(Self { person, events })
    }

    #[must_use]
    pub const fn person(&self) -> &Person {
        &self.person
    }

    #[must_use]
    pub fn events(&self) -> &[CheckInEvent] {
        &self.events
    }

    /// The most recent event. Total because the list is never empty.
    #[must_use]
    pub fn last_event(&self) -> &CheckInEvent {
        self.events
            .last()
            .unwrap_or_else(|| unreachable!("event list is never empty"))
    }

    /// Current status, read off the most recent event.
    #[must_use]
    pub fn status(&self) -> Status {
        self.last_event().status
    }

    /// Appends a new transition. Events are never edited or removed.
    pub fn push(&mut self, event: CheckInEvent) {
        self.events.push(event);
    }

    /// Appends the toggled successor of the last event and returns the
    /// new status.
    pub fn toggle(&mut self, activity: Option<CheckInActivity>, timestamp: Timestamp) -> Status {
        let status = self.status().toggled();
        self.push(CheckInEvent::new(activity, status, timestamp));
        status
    }
}
