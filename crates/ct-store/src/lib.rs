//! In-memory attendance store with binary persistence.
//!
//! The [`AttendanceStore`] owns the mapping from person id to
//! [`AttendanceRecord`] and the current activity. All mutation passes
//! through its methods; the map can be persisted to a database file in
//! a directory and exported as CSV.
//!
//! # Thread Safety
//!
//! The store guards its state with a single coarse mutex, so a shared
//! reference (for example behind an `Arc`) can be handed to concurrent
//! callers. Each operation runs its whole critical section under the
//! lock; in particular [`AttendanceStore::accept`] reads the last event
//! and appends its successor as one indivisible step, which is what
//! makes the toggle alternate strictly under contention. Persistence
//! holds the lock for the full file round-trip, an accepted cost at the
//! roster sizes this serves (tens to low thousands of people).

pub mod codec;
mod csv;
mod observer;

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ct_core::{AttendanceRecord, CheckInActivity, Person, Status, format_timestamp, now_millis};
use rand::RngCore;
use thiserror::Error;

pub use codec::DecodeError;
pub use observer::{ACTIVITY_PROPERTY, ObserverCallback, ObserverId};

/// Name of the database file inside the load/dump directory.
pub const DB_FILE_NAME: &str = "attendance-records.db";

/// How many random draws to attempt before giving up on finding an
/// unused id.
const ID_ATTEMPTS: u32 = 100;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A toggle was submitted for an id the store has never seen.
    #[error("unknown user id {id}")]
    UnknownUser { id: u64 },

    /// Random id generation kept colliding. Indicates a broken random
    /// source or a pathologically full id space, not user error.
    #[error("could not generate an unused id after {attempts} attempts")]
    IdSpaceExhausted { attempts: u32 },

    /// An explicitly supplied id is already registered.
    #[error("id {id} is already registered")]
    IdCollision { id: u64 },

    /// A load/dump path is not an existing directory, or a CSV export
    /// path is not an existing file.
    #[error("path {} must be an existing {expected}", path.display())]
    InvalidPath {
        path: PathBuf,
        expected: &'static str,
    },

    /// File I/O failed while reading or writing the database.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The database file could not be decoded.
    #[error("corrupt database file: {0}")]
    Corrupt(#[from] DecodeError),
}

/// Shared store state, guarded by one mutex.
struct Inner {
    activity: Option<CheckInActivity>,
    records: HashMap<u64, AttendanceRecord>,
}

/// The process-wide attendance "database".
///
/// Constructed once by the application's composition root and passed by
/// reference to every caller; there is no hidden singleton.
pub struct AttendanceStore {
    inner: Mutex<Inner>,
    observers: Mutex<observer::ObserverRegistry>,
}

impl Default for AttendanceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AttendanceStore {
    /// Creates an empty store with no activity set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                activity: None,
                records: HashMap::new(),
            }),
            observers: Mutex::new(observer::ObserverRegistry::default()),
        }
    }

    /// A poisoned lock means another caller panicked mid-operation; the
    /// map itself is still structurally sound (every mutation is a
    /// single append or insert), so we keep serving rather than
    /// cascading the panic.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // === Roster management ===

    /// Registers a new person under a freshly generated id and seeds
    /// their record with a checked-out event at timestamp 0.
    pub fn add_user(&self, first_name: &str, last_name: &str) -> Result<Person, StoreError> {
        let mut inner = self.lock();
        let mut rng = rand::thread_rng();
        let id = (0..ID_ATTEMPTS)
            .map(|_| rng.next_u64())
            .find(|id| !inner.records.contains_key(id))
            .ok_or(StoreError::IdSpaceExhausted {
                attempts: ID_ATTEMPTS,
            })?;
        Ok(Self::insert_user(&mut inner, id, first_name, last_name))
    }

    /// Registers a new person under a caller-supplied id, for hardware
    /// tokens whose card id is fixed in advance.
    pub fn add_user_with_id(
        &self,
        id: u64,
        first_name: &str,
        last_name: &str,
    ) -> Result<Person, StoreError> {
        let mut inner = self.lock();
        if inner.records.contains_key(&id) {
            return Err(StoreError::IdCollision { id });
        }
        Ok(Self::insert_user(&mut inner, id, first_name, last_name))
    }

    fn insert_user(inner: &mut Inner, id: u64, first_name: &str, last_name: &str) -> Person {
        let person = Person::new(id, first_name, last_name);
        let record = AttendanceRecord::new(person.clone(), inner.activity.clone());
        inner.records.insert(id, record);
        tracing::debug!(id, %person, "registered user");
        person
    }

    /// Finds a person by case-insensitive name match.
    ///
    /// When several people share a name this returns the first match in
    /// map iteration order, which is unspecified; callers that need a
    /// particular one should go by id.
    #[must_use]
    pub fn find_person(&self, first_name: &str, last_name: &str) -> Option<Person> {
        self.lock()
            .records
            .values()
            .map(AttendanceRecord::person)
            .find(|p| p.name_matches(first_name, last_name))
            .cloned()
    }

    /// A snapshot of one person's record.
    #[must_use]
    pub fn get_attendance_record(&self, id: u64) -> Option<AttendanceRecord> {
        self.lock().records.get(&id).cloned()
    }

    /// All registered ids, in unspecified order.
    #[must_use]
    pub fn id_set(&self) -> Vec<u64> {
        self.lock().records.keys().copied().collect()
    }

    /// A snapshot of every record, sorted by case-insensitive
    /// `"last first"` name.
    #[must_use]
    pub fn sorted_attendance_records(&self) -> Vec<AttendanceRecord> {
        Self::sorted_snapshot(&self.lock())
    }

    fn sorted_snapshot(inner: &Inner) -> Vec<AttendanceRecord> {
        let mut records: Vec<AttendanceRecord> = Vec::with_capacity(inner.records.len());
        for (id, record) in &inner.records {
            if *id != record.person().id {
                // Should be impossible: the map is keyed by person id at
                // every insertion site.
                tracing::warn!(
                    key = id,
                    person_id = record.person().id,
                    person = %record.person(),
                    "map key does not match person id"
                );
            }
            records.push(record.clone());
        }
        records.sort_by_key(|r| r.person().sort_key());
        records
    }

    // === Toggle state machine ===

    /// Accepts a check-in or check-out for the given id.
    ///
    /// Appends the toggled successor of the person's last event, tagged
    /// with the current activity and wall-clock time. Returns `true`
    /// when the person is now checked in, `false` when checked out.
    pub fn accept(&self, id: u64) -> Result<bool, StoreError> {
        let mut inner = self.lock();
        let activity = inner.activity.clone();
        let record = inner
            .records
            .get_mut(&id)
            .ok_or(StoreError::UnknownUser { id })?;
        let status = record.toggle(activity, now_millis());
        tracing::debug!(id, %status, "accepted toggle");
        Ok(status == Status::CheckedIn)
    }

    /// Checks out everyone still checked in. Records already checked
    /// out are left untouched, so a second sweep is a no-op.
    pub fn check_out_all(&self) {
        let mut inner = self.lock();
        let activity = inner.activity.clone();
        let timestamp = now_millis();
        for record in inner.records.values_mut() {
            if record.status() == Status::CheckedIn {
                record.toggle(activity.clone(), timestamp);
                tracing::info!(
                    id = record.person().id,
                    person = %record.person(),
                    "checked out"
                );
            }
        }
    }

    // === Activity management ===

    /// The current activity, if one is set.
    #[must_use]
    pub fn activity(&self) -> Option<CheckInActivity> {
        self.lock().activity.clone()
    }

    /// Replaces the current activity and notifies observers with the
    /// old and new values, synchronously and in registration order.
    pub fn set_activity(&self, activity: Option<CheckInActivity>) {
        let old = {
            let mut inner = self.lock();
            std::mem::replace(&mut inner.activity, activity.clone())
        };
        // Snapshot the interested callbacks, then invoke with no lock
        // held so an observer can call back into the store, including
        // subscribe and unsubscribe.
        let interested = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .interested(ACTIVITY_PROPERTY);
        for callback in interested {
            callback(old.as_ref(), activity.as_ref());
        }
    }

    /// Registers an observer. `property` of `None` subscribes to every
    /// notification; [`ACTIVITY_PROPERTY`] filters to activity changes.
    pub fn subscribe<F>(&self, property: Option<&str>, callback: F) -> ObserverId
    where
        F: Fn(Option<&CheckInActivity>, Option<&CheckInActivity>) + Send + Sync + 'static,
    {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .subscribe(property, Arc::new(callback))
    }

    /// Unregisters an observer, returning whether it was registered.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .unsubscribe(id)
    }

    // === Persistence ===

    /// Writes the full store state to `attendance-records.db` inside
    /// the given directory, which must already exist.
    pub fn dump(&self, dir: &Path) -> Result<(), StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::InvalidPath {
                path: dir.to_path_buf(),
                expected: "directory",
            });
        }
        // The lock is held through the write so the file never lags a
        // concurrent mutation that started after the snapshot.
        let inner = self.lock();
        let records: Vec<AttendanceRecord> = inner.records.values().cloned().collect();
        let bytes = codec::encode(inner.activity.as_ref(), &records);
        let path = dir.join(DB_FILE_NAME);
        fs::write(&path, &bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "dumped database");
        Ok(())
    }

    /// Loads `attendance-records.db` from the given directory.
    ///
    /// The file is decoded completely before the store is touched, so a
    /// corrupt file never leaves the store partially mutated. On
    /// success the current activity is replaced and loaded records are
    /// merged into the map, overwriting existing entries with the same
    /// id.
    pub fn load(&self, dir: &Path) -> Result<(), StoreError> {
        if !dir.is_dir() {
            return Err(StoreError::InvalidPath {
                path: dir.to_path_buf(),
                expected: "directory",
            });
        }
        let path = dir.join(DB_FILE_NAME);
        let bytes = fs::read(&path)?;
        let (activity, records) = codec::decode(&bytes)?;
        tracing::debug!(
            path = %path.display(),
            records = records.len(),
            "loaded database"
        );

        let mut inner = self.lock();
        inner.activity = activity;
        for record in records {
            inner.records.insert(record.person().id, record);
        }
        Ok(())
    }

    /// Writes the CSV export to the given path, which must already
    /// exist as a file.
    pub fn dump_csv(&self, path: &Path) -> Result<(), StoreError> {
        if !path.is_file() {
            return Err(StoreError::InvalidPath {
                path: path.to_path_buf(),
                expected: "file",
            });
        }
        let inner = self.lock();
        let rendered = csv::render(inner.activity.as_ref(), &Self::sorted_snapshot(&inner));
        fs::write(path, rendered)?;
        Ok(())
    }

    // === Display ===

    /// Renders the activity header and each record's most recent event,
    /// in map iteration order.
    #[must_use]
    pub fn print_to_string(&self) -> String {
        let inner = self.lock();
        let mut out = String::new();
        if let Some(activity) = &inner.activity {
            let _ = writeln!(out, "{}", activity.render());
        }
        for (id, record) in &inner.records {
            let event = record.last_event();
            let _ = writeln!(
                out,
                "id {} name {} check-in {} {}",
                id,
                record.person(),
                event.status,
                format_timestamp(event.timestamp)
            );
        }
        out
    }

    /// Writes the same rendering as [`Self::print_to_string`] to
    /// standard output.
    pub fn print(&self) {
        print!("{}", self.print_to_string());
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ct_core::CheckInEvent;
    use tempfile::TempDir;

    use super::*;

    fn meetup() -> CheckInActivity {
        CheckInActivity::new("Meetup", 1000, 2000)
    }

    #[test]
    fn add_user_seeds_checked_out_record() {
        let store = AttendanceStore::new();
        let person = store.add_user("Jane", "Doe").unwrap();

        let record = store.get_attendance_record(person.id).unwrap();
        assert_eq!(record.events().len(), 1);
        assert_eq!(record.last_event().status, Status::CheckedOut);
        assert_eq!(record.last_event().timestamp, 0);
        assert!(store.id_set().contains(&person.id));
    }

    #[test]
    fn added_ids_are_unique() {
        let store = AttendanceStore::new();
        let mut ids: Vec<u64> = (0..50)
            .map(|i| store.add_user(&format!("p{i}"), "x").unwrap().id)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 50);
    }

    #[test]
    fn add_user_with_id_rejects_collision() {
        let store = AttendanceStore::new();
        store.add_user_with_id(2_484_625_644, "Blue1", "Token1").unwrap();
        let err = store
            .add_user_with_id(2_484_625_644, "Blue2", "Token2")
            .unwrap_err();
        assert!(matches!(err, StoreError::IdCollision { id: 2_484_625_644 }));
    }

    #[test]
    fn accept_strictly_alternates() {
        let store = AttendanceStore::new();
        let person = store.add_user("Jane", "Doe").unwrap();

        for expected in [true, false, true, false, true] {
            assert_eq!(store.accept(person.id).unwrap(), expected);
        }
        let record = store.get_attendance_record(person.id).unwrap();
        assert_eq!(record.status(), Status::CheckedIn);
        assert_eq!(record.events().len(), 6);
    }

    #[test]
    fn accept_unknown_id_fails_and_leaves_store_unchanged() {
        let store = AttendanceStore::new();
        store.add_user("Jane", "Doe").unwrap();

        let err = store.accept(12345).unwrap_err();
        assert!(matches!(err, StoreError::UnknownUser { id: 12345 }));
        assert_eq!(store.id_set().len(), 1);
        let id = store.id_set()[0];
        assert_eq!(store.get_attendance_record(id).unwrap().events().len(), 1);
    }

    #[test]
    fn toggle_tags_current_activity() {
        let store = AttendanceStore::new();
        store.set_activity(Some(meetup()));
        let person = store.add_user("Jane", "Doe").unwrap();

        assert!(store.accept(person.id).unwrap());
        let record = store.get_attendance_record(person.id).unwrap();
        assert_eq!(record.last_event().status, Status::CheckedIn);
        assert_eq!(
            record.last_event().activity.as_ref().map(|a| a.name.as_str()),
            Some("Meetup")
        );

        assert!(!store.accept(person.id).unwrap());
        let record = store.get_attendance_record(person.id).unwrap();
        assert_eq!(record.last_event().status, Status::CheckedOut);
    }

    #[test]
    fn check_out_all_is_idempotent() {
        let store = AttendanceStore::new();
        let in_person = store.add_user("Jane", "Doe").unwrap();
        let out_person = store.add_user("Bob", "Anders").unwrap();
        store.accept(in_person.id).unwrap();

        store.check_out_all();
        let first = store.get_attendance_record(in_person.id).unwrap();
        assert_eq!(first.status(), Status::CheckedOut);
        let events_after_first = first.events().len();
        let untouched = store.get_attendance_record(out_person.id).unwrap();
        assert_eq!(untouched.events().len(), 1);

        store.check_out_all();
        let second = store.get_attendance_record(in_person.id).unwrap();
        assert_eq!(second.events().len(), events_after_first);
    }

    #[test]
    fn find_person_is_case_insensitive() {
        let store = AttendanceStore::new();
        let person = store.add_user("Jane", "Doe").unwrap();

        assert_eq!(store.find_person("jane", "DOE"), Some(person));
        assert_eq!(store.find_person("John", "Doe"), None);
    }

    #[test]
    fn sorted_records_order_by_last_then_first_name() {
        let store = AttendanceStore::new();
        store.add_user("Alice", "Zephyr").unwrap();
        store.add_user("Bob", "Anders").unwrap();
        store.add_user("carol", "anders").unwrap();

        let sorted = store.sorted_attendance_records();
        let names: Vec<String> = sorted
            .iter()
            .map(|r| r.person().to_string())
            .collect();
        assert_eq!(names, vec!["Bob Anders", "carol anders", "Alice Zephyr"]);
    }

    #[test]
    fn set_activity_notifies_observers_with_old_and_new() {
        let store = AttendanceStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(Some(ACTIVITY_PROPERTY), move |old, new| {
            sink.lock().unwrap().push((
                old.map(|a| a.name.clone()),
                new.map(|a| a.name.clone()),
            ));
        });

        store.set_activity(Some(meetup()));
        store.set_activity(None);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                (None, Some("Meetup".to_string())),
                (Some("Meetup".to_string()), None),
            ]
        );
    }

    #[test]
    fn unsubscribed_observer_is_not_notified() {
        let store = AttendanceStore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&hits);
        let id = store.subscribe(None, move |_, _| {
            sink.fetch_add(1, Ordering::SeqCst);
        });

        store.set_activity(Some(meetup()));
        assert!(store.unsubscribe(id));
        store.set_activity(None);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observer_may_subscribe_from_inside_a_callback() {
        let store = Arc::new(AttendanceStore::new());
        let hits = Arc::new(AtomicUsize::new(0));

        let registrar = Arc::clone(&store);
        let sink = Arc::clone(&hits);
        store.subscribe(Some(ACTIVITY_PROPERTY), move |_, _| {
            let sink = Arc::clone(&sink);
            registrar.subscribe(None, move |_, _| {
                sink.fetch_add(1, Ordering::SeqCst);
            });
        });

        // First change registers a second observer from within the
        // callback; it must not see the notification that created it.
        store.set_activity(Some(meetup()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        // Second change reaches the observer registered above.
        store.set_activity(None);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn observer_may_unsubscribe_itself() {
        let store = AttendanceStore::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let slot: Arc<Mutex<Option<ObserverId>>> = Arc::new(Mutex::new(None));

        let sink = Arc::clone(&hits);
        let own_id = Arc::clone(&slot);
        let store = Arc::new(store);
        let registrar = Arc::clone(&store);
        let id = store.subscribe(Some(ACTIVITY_PROPERTY), move |_, _| {
            sink.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = own_id.lock().unwrap().take() {
                assert!(registrar.unsubscribe(id));
            }
        });
        *slot.lock().unwrap() = Some(id);

        store.set_activity(Some(meetup()));
        store.set_activity(None);

        // Fired once, then removed itself.
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dump_then_load_roundtrips_full_state() {
        let dir = TempDir::new().unwrap();
        let store = AttendanceStore::new();
        store.set_activity(Some(meetup()));
        let person = store.add_user("Jane", "Doe").unwrap();
        store.accept(person.id).unwrap();
        store.accept(person.id).unwrap();
        store.dump(dir.path()).unwrap();

        let fresh = AttendanceStore::new();
        fresh.load(dir.path()).unwrap();

        assert_eq!(fresh.activity(), Some(meetup()));
        let original = store.get_attendance_record(person.id).unwrap();
        let loaded = fresh.get_attendance_record(person.id).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.events().len(), 3);
    }

    #[test]
    fn load_merges_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let source = AttendanceStore::new();
        let person = source.add_user_with_id(7, "Jane", "Doe").unwrap();
        source.accept(person.id).unwrap();
        source.dump(dir.path()).unwrap();

        let target = AttendanceStore::new();
        target.add_user_with_id(7, "Stale", "Entry").unwrap();
        target.add_user_with_id(8, "Kept", "Around").unwrap();
        target.load(dir.path()).unwrap();

        // Id 7 was overwritten by the loaded record; id 8 survived.
        let merged = target.get_attendance_record(7).unwrap();
        assert_eq!(merged.person().first_name, "Jane");
        assert_eq!(merged.events().len(), 2);
        assert!(target.get_attendance_record(8).is_some());
    }

    #[test]
    fn load_of_corrupt_file_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DB_FILE_NAME), b"JUNKJUNKJUNK").unwrap();

        let store = AttendanceStore::new();
        store.set_activity(Some(meetup()));
        store.add_user_with_id(7, "Jane", "Doe").unwrap();

        let err = store.load(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
        assert_eq!(store.activity(), Some(meetup()));
        assert_eq!(store.id_set(), vec![7]);
    }

    #[test]
    fn dump_and_load_reject_non_directories() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("not-a-dir");
        fs::write(&file, b"x").unwrap();

        let store = AttendanceStore::new();
        assert!(matches!(
            store.dump(&file).unwrap_err(),
            StoreError::InvalidPath { expected: "directory", .. }
        ));
        assert!(matches!(
            store.load(&file).unwrap_err(),
            StoreError::InvalidPath { expected: "directory", .. }
        ));
    }

    #[test]
    fn dump_csv_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = AttendanceStore::new();

        let missing = dir.path().join("out.csv");
        assert!(matches!(
            store.dump_csv(&missing).unwrap_err(),
            StoreError::InvalidPath { expected: "file", .. }
        ));

        fs::write(&missing, b"").unwrap();
        store.dump_csv(&missing).unwrap();
        let content = fs::read_to_string(&missing).unwrap();
        assert!(content.starts_with("Activity Name,Start Date,End Date\n"));
    }

    #[test]
    fn print_to_string_shows_last_event_per_record() {
        let store = AttendanceStore::new();
        store.set_activity(Some(meetup()));
        let person = store.add_user("Jane", "Doe").unwrap();
        store.accept(person.id).unwrap();

        let rendered = store.print_to_string();
        assert!(rendered.starts_with("activity Meetup start "));
        assert!(rendered.contains(&format!("id {} name Jane Doe check-in CheckedIn", person.id)));
        // Only the most recent event appears.
        assert!(!rendered.contains("CheckedOut"));
    }

    #[test]
    fn concurrent_accepts_keep_history_alternating() {
        let store = Arc::new(AttendanceStore::new());
        let person = store.add_user("Jane", "Doe").unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = person.id;
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        store.accept(id).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let record = store.get_attendance_record(person.id).unwrap();
        assert_eq!(record.events().len(), 201);
        for pair in record.events().windows(2) {
            assert_eq!(pair[1].status, pair[0].status.toggled());
        }
    }

    #[test]
    fn seed_event_after_activity_set_is_tagged() {
        let store = AttendanceStore::new();
        store.set_activity(Some(meetup()));
        let person = store.add_user("Jane", "Doe").unwrap();

        let record = store.get_attendance_record(person.id).unwrap();
        assert_eq!(
            record.events()[0],
            CheckInEvent::new(Some(meetup()), Status::CheckedOut, 0)
        );
    }
}
