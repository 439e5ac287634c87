//! Observer registration for activity changes.
//!
//! Observers are invoked synchronously inside the mutating call, in
//! registration order. A failing observer is its own problem: the
//! activity change it observed has already happened and is not rolled
//! back.
//!
//! The registry only stores and selects callbacks; invocation happens
//! in the store after the registry lock is released, so a callback may
//! subscribe, unsubscribe, or mutate the store without deadlocking.

use std::sync::Arc;

use ct_core::CheckInActivity;

/// Property name under which activity replacements are announced.
pub const ACTIVITY_PROPERTY: &str = "activity";

/// Callback invoked with the old and new activity values.
///
/// Shared rather than owned so notification can run on a snapshot
/// taken outside the registry lock.
pub type ObserverCallback =
    Arc<dyn Fn(Option<&CheckInActivity>, Option<&CheckInActivity>) + Send + Sync>;

/// Handle returned by [`crate::AttendanceStore::subscribe`], used to
/// unregister the observer later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

struct Observer {
    id: ObserverId,
    /// `None` subscribes to every property.
    property: Option<String>,
    callback: ObserverCallback,
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    observers: Vec<Observer>,
}

impl ObserverRegistry {
    pub(crate) fn subscribe(
        &mut self,
        property: Option<&str>,
        callback: ObserverCallback,
    ) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push(Observer {
            id,
            property: property.map(str::to_owned),
            callback,
        });
        id
    }

    /// Removes the observer, returning whether it was registered.
    pub(crate) fn unsubscribe(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    /// The callbacks subscribed to `property`, in registration order.
    ///
    /// Callers invoke these after dropping the registry lock.
    pub(crate) fn interested(&self, property: &str) -> Vec<ObserverCallback> {
        self.observers
            .iter()
            .filter(|o| o.property.as_deref().is_none_or(|p| p == property))
            .map(|o| Arc::clone(&o.callback))
            .collect()
    }
}
