//! Identity records for roster members.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An immutable identity record.
///
/// Ids are assigned by the store and are unique within it; two `Person`
/// values compare equal only when all fields match, but the store keys
/// records by id alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    pub fn new(id: u64, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// Case-insensitive match on both name fields.
    ///
    /// Case folding is Unicode-aware, matching the folding
    /// [`Person::sort_key`] uses for roster ordering.
    #[must_use]
    pub fn name_matches(&self, first_name: &str, last_name: &str) -> bool {
        self.first_name.to_lowercase() == first_name.to_lowercase()
            && self.last_name.to_lowercase() == last_name.to_lowercase()
    }

    /// Sort key used for roster ordering: `"last first"`, lowercased.
    #[must_use]
    pub fn sort_key(&self) -> String {
        format!("{} {}", self.last_name, self.first_name).to_lowercase()
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}
