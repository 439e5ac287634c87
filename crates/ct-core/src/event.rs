//! Check-in status transitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::CheckInActivity;
use crate::time::Timestamp;

/// Whether a person is currently present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    CheckedIn,
    CheckedOut,
}

impl Status {
    /// The status after one more toggle. Anything that is not exactly
    /// `CheckedIn` toggles to `CheckedIn`, so toggling is total.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::CheckedIn => Self::CheckedOut,
            Self::CheckedOut => Self::CheckedIn,
        }
    }

    /// Token used in CSV exports and the status display.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckedIn => "CheckedIn",
            Self::CheckedOut => "CheckedOut",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CheckedIn" => Ok(Self::CheckedIn),
            "CheckedOut" => Ok(Self::CheckedOut),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// Error type for unrecognized status tokens.
#[derive(Debug, Clone, Error)]
#[error("unknown check-in status: {0}")]
pub struct UnknownStatus(String);

/// An immutable timestamped status transition.
///
/// The activity is the one current when the event occurred; `None` means
/// the store had no activity set at the time. Two events are equal iff
/// activity, status, and timestamp all match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInEvent {
    pub activity: Option<CheckInActivity>,
    pub status: Status,
    pub timestamp: Timestamp,
}

impl CheckInEvent {
    pub const fn new(
        activity: Option<CheckInActivity>,
        status: Status,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            activity,
            status,
            timestamp,
        }
    }

    /// The event's activity, backfilled with the default sentinel when
    /// unset. For display and export only.
    #[must_use]
    pub fn activity_or_default(&self) -> CheckInActivity {
        self.activity
            .clone()
            .unwrap_or_else(CheckInActivity::default_sentinel)
    }
}
