//! CSV export of the schedule.
//!
//! Column order and presence are what downstream spreadsheets depend on;
//! append new columns at the end, never reorder.

use std::borrow::Cow;
use std::fmt::Write as _;
use std::io::{self, Write};

use wt_core::ScheduleEntry;

use crate::MAX_GALLONS_PRECISION;

pub const CSV_HEADER: [&str; 5] = ["customer_id", "name", "due_date", "status", "gallons_needed"];

/// Renders `entries` in the given order. Undefined values are empty fields;
/// precision is capped at [`MAX_GALLONS_PRECISION`].
pub fn to_csv<'a>(entries: impl IntoIterator<Item = &'a ScheduleEntry>, gallons_precision: u32) -> String {
    let precision = gallons_precision.min(MAX_GALLONS_PRECISION) as usize;
    let mut csv = CSV_HEADER.join(",");
    csv.push('\n');
    for entry in entries {
        let due = entry.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        let gallons = entry
            .gallons_needed
            .map(|g| format!("{g:.precision$}"))
            .unwrap_or_default();
        let _ = writeln!(
            csv,
            "{},{},{},{},{}",
            entry.customer_id,
            escape(&entry.name),
            due,
            entry.status,
            gallons
        );
    }
    csv
}

pub fn write_csv<'a, W: Write>(
    entries: impl IntoIterator<Item = &'a ScheduleEntry>,
    gallons_precision: u32,
    mut out: W,
) -> io::Result<()> {
    out.write_all(to_csv(entries, gallons_precision).as_bytes())?;
    out.flush()
}

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wt_core::{UnscheduledReason, UrgencyStatus};

    fn entry(id: u64, name: &str) -> ScheduleEntry {
        ScheduleEntry {
            customer_id: id,
            name: name.to_string(),
            due_date: None,
            status: UrgencyStatus::Unscheduled,
            unscheduled_reason: Some(UnscheduledReason::NoHistory),
            gallons_needed: None,
            last_filled: None,
            interval_days: None,
            days_until_due: None,
            risk_score: None,
            coordinates: None,
        }
    }

    #[test]
    fn header_and_empty_fields() {
        let csv = to_csv(&[entry(4, "Creek House")], 0);
        assert_eq!(csv, "customer_id,name,due_date,status,gallons_needed\n4,Creek House,,UNSCHEDULED,\n");
    }

    #[test]
    fn dates_and_precision() {
        let mut e = entry(1, "Ranch");
        e.due_date = NaiveDate::from_ymd_opt(2024, 9, 5);
        e.status = UrgencyStatus::Overdue;
        e.gallons_needed = Some(1250.0);
        assert!(to_csv([&e], 0).ends_with("1,Ranch,2024-09-05,OVERDUE,1250\n"));

        e.gallons_needed = Some(12.5);
        assert!(to_csv([&e], 2).ends_with(",12.50\n"));
    }

    #[test]
    fn precision_is_capped() {
        let mut e = entry(1, "Ranch");
        e.gallons_needed = Some(12.5);
        assert!(to_csv([&e], 9).ends_with(",12.500000\n"));
        assert!(to_csv([&e], u32::MAX).ends_with(",12.500000\n"));
    }

    #[test]
    fn writer_matches_string_rendering() {
        let rows = [entry(4, "Creek House"), entry(5, "Mesa")];
        let mut buf = Vec::new();
        write_csv(&rows, 0, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), to_csv(&rows, 0));
    }

    #[test]
    fn quotes_awkward_names() {
        let csv = to_csv(&[entry(2, "Smith, \"Big\" Tank")], 0);
        assert!(csv.contains("2,\"Smith, \"\"Big\"\" Tank\",,UNSCHEDULED,"));
    }
}
