//! Binary encoding of the persisted store state.
//!
//! The database file is a self-describing little-endian sequence:
//! a 4-byte magic, a format version, the current activity (or an
//! explicit "none" tag), then the full id-to-record mapping. Strings
//! are length-prefixed UTF-8, instants are `i64` epoch milliseconds.
//!
//! Decoding never partially succeeds: [`decode`] either returns the
//! complete state or an error, so callers can commit atomically.

use ct_core::{AttendanceRecord, CheckInActivity, CheckInEvent, Person, Status};
use thiserror::Error;

/// File magic, first four bytes of every database file.
pub const MAGIC: [u8; 4] = *b"CTDB";

/// Current format version. Bumped on any incompatible layout change;
/// older versions are rejected rather than migrated.
pub const FORMAT_VERSION: u16 = 1;

const TAG_NONE: u8 = 0;
const TAG_SOME: u8 = 1;

const STATUS_CHECKED_OUT: u8 = 0;
const STATUS_CHECKED_IN: u8 = 1;

/// Errors produced while decoding a database file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file does not start with the expected magic bytes.
    #[error("not a check-in database file (bad magic)")]
    BadMagic,
    /// The file was written by an incompatible format version.
    #[error("unsupported database format version {0}")]
    UnsupportedVersion(u16),
    /// The file ended before the declared content did.
    #[error("database file is truncated at offset {offset}")]
    Truncated { offset: usize },
    /// A one-byte tag held a value outside its domain.
    #[error("invalid {field} tag {value} at offset {offset}")]
    BadTag {
        field: &'static str,
        value: u8,
        offset: usize,
    },
    /// A length-prefixed string was not valid UTF-8.
    #[error("invalid utf-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    /// A record declared zero events, which no writer ever produces.
    #[error("record for id {id} has an empty event history")]
    EmptyHistory { id: u64 },
}

/// Encodes the full store state: current activity plus every record.
///
/// Record iteration order is not significant; decode rebuilds the map
/// keyed by each person's id.
#[must_use]
pub fn encode(activity: Option<&CheckInActivity>, records: &[AttendanceRecord]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    put_activity_slot(&mut buf, activity);
    buf.extend_from_slice(&(records.len() as u64).to_le_bytes());
    for record in records {
        put_record(&mut buf, record);
    }
    buf
}

/// Decodes a database file into its activity slot and records.
pub fn decode(bytes: &[u8]) -> Result<(Option<CheckInActivity>, Vec<AttendanceRecord>), DecodeError> {
    let mut r = Reader::new(bytes);
    if r.take(4)? != MAGIC {
        return Err(DecodeError::BadMagic);
    }
    let version = r.u16()?;
    if version != FORMAT_VERSION {
        return Err(DecodeError::UnsupportedVersion(version));
    }
    let activity = take_activity_slot(&mut r)?;
    let count = r.u64()?;
    // No pre-allocation from the declared count: it is untrusted input.
    let mut records = Vec::new();
    for _ in 0..count {
        records.push(take_record(&mut r)?);
    }
    Ok((activity, records))
}

fn put_activity_slot(buf: &mut Vec<u8>, activity: Option<&CheckInActivity>) {
    match activity {
        None => buf.push(TAG_NONE),
        Some(a) => {
            buf.push(TAG_SOME);
            put_str(buf, &a.name);
            buf.extend_from_slice(&a.start_time.to_le_bytes());
            buf.extend_from_slice(&a.end_time.to_le_bytes());
        }
    }
}

fn take_activity_slot(r: &mut Reader<'_>) -> Result<Option<CheckInActivity>, DecodeError> {
    let offset = r.pos;
    match r.u8()? {
        TAG_NONE => Ok(None),
        TAG_SOME => {
            let name = r.str()?;
            let start_time = r.i64()?;
            let end_time = r.i64()?;
            Ok(Some(CheckInActivity::new(name, start_time, end_time)))
        }
        value => Err(DecodeError::BadTag {
            field: "activity",
            value,
            offset,
        }),
    }
}

fn put_record(buf: &mut Vec<u8>, record: &AttendanceRecord) {
    let person = record.person();
    buf.extend_from_slice(&person.id.to_le_bytes());
    put_str(buf, &person.first_name);
    put_str(buf, &person.last_name);
    buf.extend_from_slice(&(record.events().len() as u64).to_le_bytes());
    for event in record.events() {
        put_activity_slot(buf, event.activity.as_ref());
        buf.push(match event.status {
            Status::CheckedOut => STATUS_CHECKED_OUT,
            Status::CheckedIn => STATUS_CHECKED_IN,
        });
        buf.extend_from_slice(&event.timestamp.to_le_bytes());
    }
}

fn take_record(r: &mut Reader<'_>) -> Result<AttendanceRecord, DecodeError> {
    let id = r.u64()?;
    let first_name = r.str()?;
    let last_name = r.str()?;
    let count = r.u64()?;
    let mut events = Vec::new();
    for _ in 0..count {
        let activity = take_activity_slot(r)?;
        let offset = r.pos;
        let status = match r.u8()? {
            STATUS_CHECKED_OUT => Status::CheckedOut,
            STATUS_CHECKED_IN => Status::CheckedIn,
            value => {
                return Err(DecodeError::BadTag {
                    field: "status",
                    value,
                    offset,
                });
            }
        };
        let timestamp = r.i64()?;
        events.push(CheckInEvent::new(activity, status, timestamp));
    }
    let person = Person::new(id, first_name, last_name);
    AttendanceRecord::from_parts(person, events).ok_or(DecodeError::EmptyHistory { id })
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Cursor over the raw file bytes, tracking the offset for error reports.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(DecodeError::Truncated { offset: self.pos })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self) -> Result<u64, DecodeError> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(u64::from_le_bytes(raw))
    }

    fn i64(&mut self) -> Result<i64, DecodeError> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(i64::from_le_bytes(raw))
    }

    fn str(&mut self) -> Result<String, DecodeError> {
        let len = self.u32()? as usize;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { offset })
    }
}
