use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;

use sidecron_core::types::ScheduleEntry;

use crate::error::ParseError;
use crate::table::JobRow;

/// Full month names used by the when-expression grammar.
const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Rows written by the original authoring tool spell October this way.
/// Accepted on decode for backward compatibility, never written.
const LEGACY_OCTOBER: &str = "Oktober";

fn when_re() -> &'static Regex {
    static WHEN_RE: OnceLock<Regex> = OnceLock::new();
    WHEN_RE.get_or_init(|| {
        Regex::new(r"^at (\d{1,2}):(\d{2}) on the (\d{1,2}) day of ([A-Za-z]+) in (\d{4})$")
            .unwrap()
    })
}

/// Format a schedule entry as a crontab row.
///
/// Hours and minutes are zero-padded, the day of month is not — that is what
/// existing rows look like, so it stays that way.
pub fn encode(entry: &ScheduleEntry) -> JobRow {
    let dt = entry.datetime;
    JobRow::new(
        format!(
            "at {:02}:{:02} on the {} day of {} in {}",
            dt.hour(),
            dt.minute(),
            dt.day(),
            MONTHS[dt.month0() as usize],
            dt.year(),
        ),
        format!("publish {}", entry.path),
    )
}

/// Parse a crontab row back into a schedule entry.
///
/// The when-expression must match the grammar exactly; anything else is a
/// [`ParseError`], including month names outside the fixed list and field
/// combinations that do not form a real calendar time (e.g. `31 day of
/// February`).
pub fn decode(row: &JobRow) -> Result<ScheduleEntry, ParseError> {
    let when = row.when.trim();
    let caps = when_re()
        .captures(when)
        .ok_or_else(|| ParseError::Grammar(when.to_string()))?;

    // The regex only admits digits, so these parses cannot fail in practice.
    let grammar_err = || ParseError::Grammar(when.to_string());
    let hour: u32 = caps[1].parse().map_err(|_| grammar_err())?;
    let minute: u32 = caps[2].parse().map_err(|_| grammar_err())?;
    let day: u32 = caps[3].parse().map_err(|_| grammar_err())?;
    let year: i32 = caps[5].parse().map_err(|_| grammar_err())?;

    let month = month_index(&caps[4])
        .ok_or_else(|| ParseError::UnknownMonth(caps[4].to_string()))?
        + 1;

    let bad_date = ParseError::BadDate {
        year,
        month,
        day,
        hour,
        minute,
    };
    let datetime = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or(bad_date)?;

    Ok(ScheduleEntry::new(datetime, action_path(&row.action)))
}

/// Target path referenced by an action cell: its last whitespace-delimited
/// token. Tolerates any verb prefix; paths containing spaces are not
/// supported by the grammar.
pub fn action_path(action: &str) -> String {
    action.split_whitespace().last().unwrap_or("").to_string()
}

fn month_index(name: &str) -> Option<u32> {
    if name == LEGACY_OCTOBER {
        return Some(9);
    }
    MONTHS.iter().position(|m| *m == name).map(|i| i as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(y: i32, mo: u32, d: u32, h: u32, mi: u32, path: &str) -> ScheduleEntry {
        let datetime = NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap();
        ScheduleEntry::new(datetime, path)
    }

    #[test]
    fn encode_pads_time_but_not_day() {
        let row = encode(&entry(2025, 3, 5, 9, 5, "/news/foo"));
        assert_eq!(row.when, "at 09:05 on the 5 day of March in 2025");
        assert_eq!(row.action, "publish /news/foo");
    }

    #[test]
    fn round_trip_preserves_minute_and_path() {
        let original = entry(2026, 12, 31, 23, 59, "/news/year-in-review");
        let decoded = decode(&encode(&original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_known_row() {
        let row = JobRow::new(
            "at 14:30 on the 5 day of March in 2025",
            "publish /news/foo",
        );
        let decoded = decode(&row).unwrap();
        assert_eq!(decoded, entry(2025, 3, 5, 14, 30, "/news/foo"));
    }

    #[test]
    fn decode_accepts_legacy_october_spelling() {
        let row = JobRow::new(
            "at 08:00 on the 12 day of Oktober in 2025",
            "publish /news/foo",
        );
        let decoded = decode(&row).unwrap();
        assert_eq!(decoded.datetime, entry(2025, 10, 12, 8, 0, "").datetime);
        // Re-encoding writes the corrected spelling.
        assert_eq!(
            encode(&decoded).when,
            "at 08:00 on the 12 day of October in 2025"
        );
    }

    #[test]
    fn decode_rejects_unknown_month() {
        let row = JobRow::new(
            "at 14:30 on the 5 day of Smarch in 2025",
            "publish /news/foo",
        );
        assert!(matches!(
            decode(&row),
            Err(ParseError::UnknownMonth(name)) if name == "Smarch"
        ));
    }

    #[test]
    fn decode_rejects_non_grammar_text() {
        for when in [
            "",
            "publish /news/foo",
            "at 14:30 on the 5 day of March",
            "at 14:30 on the 5 day of March in 2025 extra",
            "every day at noon",
        ] {
            let row = JobRow::new(when, "publish /news/foo");
            assert!(
                matches!(decode(&row), Err(ParseError::Grammar(_))),
                "{when:?} should not decode"
            );
        }
    }

    #[test]
    fn decode_rejects_impossible_calendar_time() {
        let row = JobRow::new(
            "at 25:00 on the 31 day of February in 2025",
            "publish /news/foo",
        );
        assert!(matches!(decode(&row), Err(ParseError::BadDate { .. })));
    }

    #[test]
    fn action_path_takes_last_token() {
        assert_eq!(action_path("publish /news/foo"), "/news/foo");
        assert_eq!(action_path("unpublish then publish /a/b"), "/a/b");
        assert_eq!(action_path(""), "");
    }
}
