//! CSV export rendering.
//!
//! The export lists the activity header, a column header, then one row
//! per person carrying that person's entire event history: three
//! identity fields followed by five fields per event. Events with no
//! recorded activity are backfilled with the default sentinel.

use std::fmt::Write;

use ct_core::{AttendanceRecord, CheckInActivity, format_timestamp};

/// Renders the export for an already-sorted record list.
#[must_use]
pub(crate) fn render(activity: Option<&CheckInActivity>, records: &[AttendanceRecord]) -> String {
    let mut out = String::new();

    let header = activity
        .cloned()
        .unwrap_or_else(CheckInActivity::default_sentinel);
    out.push_str("Activity Name,Start Date,End Date\n");
    let _ = writeln!(
        out,
        "{},{},{}",
        header.name,
        format_timestamp(header.start_time),
        format_timestamp(header.end_time)
    );

    out.push_str("ID,First Name,Last Name,Activity Name,Start Date,End Date,Check-In Status,Date\n");
    for record in records {
        let person = record.person();
        let _ = write!(
            out,
            "{},{},{}",
            person.id, person.first_name, person.last_name
        );
        for event in record.events() {
            let event_activity = event.activity_or_default();
            let _ = write!(
                out,
                ",{},{},{},{},{}",
                event_activity.name,
                format_timestamp(event_activity.start_time),
                format_timestamp(event_activity.end_time),
                event.status,
                format_timestamp(event.timestamp)
            );
        }
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use ct_core::Person;

    use super::*;

    #[test]
    fn one_person_two_events_yields_thirteen_fields() {
        let activity = CheckInActivity::new("Meetup", 1000, 2000);
        let mut record = AttendanceRecord::new(Person::new(12, "Jane", "Doe"), None);
        record.toggle(Some(activity.clone()), 5000);

        let rendered = render(Some(&activity), &[record]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Activity Name,Start Date,End Date");
        assert!(lines[1].starts_with("Meetup,"));
        assert_eq!(
            lines[2],
            "ID,First Name,Last Name,Activity Name,Start Date,End Date,Check-In Status,Date"
        );

        // 3 identity fields plus 5 per event.
        let fields: Vec<&str> = lines[3].split(',').collect();
        assert_eq!(fields.len(), 13);
        assert_eq!(&fields[..3], &["12", "Jane", "Doe"]);
        // Seed event had no activity: sentinel backfill.
        assert_eq!(fields[3], "DEFAULT");
        assert_eq!(fields[6], "CheckedOut");
        assert_eq!(fields[8], "Meetup");
        assert_eq!(fields[11], "CheckedIn");
    }

    #[test]
    fn missing_store_activity_renders_sentinel_header() {
        let rendered = render(None, &[]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines[1].starts_with("DEFAULT,"));
        assert_eq!(lines.len(), 3);
    }
}
