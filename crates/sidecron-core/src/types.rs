use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single scheduled publish action: one future timestamp tied to one page
/// path (no host, no query).
///
/// The timestamp is a wall-clock time with minute precision; which timezone
/// that wall clock belongs to is decided by [`TimezonePolicy`], never by the
/// entry itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub datetime: NaiveDateTime,
    pub path: String,
}

impl ScheduleEntry {
    pub fn new(datetime: NaiveDateTime, path: impl Into<String>) -> Self {
        Self {
            datetime,
            path: path.into(),
        }
    }
}

/// Timezone applied when reading and writing crontab wall-clock times.
///
/// The same policy is used on both the encode and the decode side, so a row
/// written under one policy reads back to the same wall-clock minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimezonePolicy {
    #[default]
    Utc,
    Local,
}

impl TimezonePolicy {
    /// Current wall-clock time under this policy.
    pub fn now(&self) -> NaiveDateTime {
        match self {
            TimezonePolicy::Utc => Utc::now().naive_utc(),
            TimezonePolicy::Local => Local::now().naive_local(),
        }
    }

    /// Absolute UTC instant for a wall-clock time under this policy.
    ///
    /// Ambiguous local times (DST fold) resolve to the earlier instant;
    /// skipped local times fall back to reading the wall clock as UTC.
    pub fn to_utc(&self, wall: NaiveDateTime) -> DateTime<Utc> {
        match self {
            TimezonePolicy::Utc => Utc.from_utc_datetime(&wall),
            TimezonePolicy::Local => Local
                .from_local_datetime(&wall)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&wall)),
        }
    }

    /// Human-readable name shown next to datetime inputs.
    pub fn label(&self) -> &'static str {
        match self {
            TimezonePolicy::Utc => "UTC",
            TimezonePolicy::Local => "local time",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wall(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn utc_policy_is_identity() {
        let w = wall(2025, 3, 5, 14, 30);
        let instant = TimezonePolicy::Utc.to_utc(w);
        assert_eq!(instant.naive_utc(), w);
    }

    #[test]
    fn local_policy_round_trips_through_utc() {
        // Mid-afternoon is outside every DST transition window.
        let w = wall(2025, 3, 5, 14, 30);
        let instant = TimezonePolicy::Local.to_utc(w);
        assert_eq!(instant.with_timezone(&Local).naive_local(), w);
    }

    #[test]
    fn policy_deserializes_lowercase() {
        let p: TimezonePolicy = serde_json::from_str("\"local\"").unwrap();
        assert_eq!(p, TimezonePolicy::Local);
        let p: TimezonePolicy = serde_json::from_str("\"utc\"").unwrap();
        assert_eq!(p, TimezonePolicy::Utc);
    }

    #[test]
    fn default_policy_is_utc() {
        assert_eq!(TimezonePolicy::default(), TimezonePolicy::Utc);
    }
}
