use chrono::NaiveDateTime;
use tracing::error;

use sidecron_core::types::TimezonePolicy;
use sidecron_crontab::codec;
use sidecron_crontab::store::CrontabStore;

use crate::publish_later::target_path;

/// Read-only companion to the scheduling workflow: looks up the schedule for
/// a page and renders it, without ever mutating the store.
///
/// Unlike the workflow, failures here degrade silently — a passive status
/// widget has no business popping error dialogs, so problems are logged and
/// no label is produced.
pub struct StatusAnnotator {
    store: CrontabStore,
    policy: TimezonePolicy,
}

impl StatusAnnotator {
    pub fn new(store: CrontabStore, policy: TimezonePolicy) -> Self {
        Self { store, policy }
    }

    /// Label for the page's schedule: `"Never"` when no job matches, the
    /// formatted timestamp otherwise, `None` when the lookup failed (already
    /// logged).
    pub async fn scheduled_label(&self, target: &str) -> Option<String> {
        let path = match target_path(target) {
            Ok(path) => path,
            Err(err) => {
                error!(%target, error = %err, "invalid status target");
                return None;
            }
        };

        if let Err(err) = self.store.sign_in().await {
            error!(error = %err, "could not log into Sharepoint");
            return None;
        }

        let table = match self.store.load().await {
            Ok(table) => table,
            Err(err) => {
                error!(error = %err, "could not retrieve cron jobs");
                return None;
            }
        };

        let Some(found) = table.find_job(&path) else {
            return Some("Never".to_string());
        };

        match codec::decode(&found.row) {
            Ok(entry) => Some(format_schedule(entry.datetime)),
            Err(err) => {
                error!(error = %err, "failed to parse existing schedule");
                None
            }
        }
    }

    pub fn timezone(&self) -> &'static str {
        self.policy.label()
    }
}

/// `5 Mar 2025, 14:30` — unpadded day, short month name, 24h time.
pub fn format_schedule(datetime: NaiveDateTime) -> String {
    datetime.format("%-d %b %Y, %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn schedule_label_format() {
        let datetime = NaiveDate::from_ymd_opt(2025, 3, 5)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap();
        assert_eq!(format_schedule(datetime), "5 Mar 2025, 14:30");
    }
}
