//! The activity being tracked: a named, time-bounded event.

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, format_timestamp};

/// An immutable descriptor of a tracked event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInActivity {
    pub name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl CheckInActivity {
    pub fn new(name: impl Into<String>, start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            name: name.into(),
            start_time,
            end_time,
        }
    }

    /// Sentinel used to backfill events that were recorded before any
    /// activity was ever set. Substituted for display and export only,
    /// never stored.
    #[must_use]
    pub fn default_sentinel() -> Self {
        Self::new("DEFAULT", 0, i64::MAX)
    }

    /// One-line rendering used by the status display and the CSV
    /// activity header.
    #[must_use]
    pub fn render(&self) -> String {
        format!(
            "activity {} start {} end {}",
            self.name,
            format_timestamp(self.start_time),
            format_timestamp(self.end_time)
        )
    }
}
