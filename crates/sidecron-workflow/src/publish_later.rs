use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use tracing::{error, info};

use sidecron_core::config::DEFAULT_LEAD_TIME_MINUTES;
use sidecron_core::types::{ScheduleEntry, TimezonePolicy};
use sidecron_crontab::codec;
use sidecron_crontab::store::CrontabStore;
use sidecron_crontab::table::JobMatch;

use crate::admin::PreviewTrigger;
use crate::ui::{DialogBody, FormOutcome, Interaction, ScheduleForm, Severity};

/// Result of one workflow invocation. Control always returns to the caller;
/// nothing persists between invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// A schedule was created, updated or deleted and the preview refreshed.
    Completed,
    /// The user backed out; nothing was mutated.
    Cancelled,
    /// A step failed; the user has already been told which one.
    Failed,
}

/// States of one publish-later invocation. Each handler returns the next
/// state; `Done` ends the loop.
enum State {
    Authenticating,
    Loading,
    FormOpen { existing: Option<JobMatch> },
    Submitting {
        datetime: NaiveDateTime,
        existing: Option<usize>,
    },
    Deleting { position: usize },
    Done(WorkflowOutcome),
}

/// The scheduling workflow: authenticate, resolve any existing job for the
/// page, let the user decide, then create/update/delete the row and refresh
/// the crontab's JSON projection.
pub struct PublishLaterWorkflow {
    store: CrontabStore,
    preview: Arc<dyn PreviewTrigger>,
    ui: Arc<dyn Interaction>,
    policy: TimezonePolicy,
    lead_time: Duration,
}

impl PublishLaterWorkflow {
    pub fn new(
        store: CrontabStore,
        preview: Arc<dyn PreviewTrigger>,
        ui: Arc<dyn Interaction>,
        policy: TimezonePolicy,
    ) -> Self {
        Self {
            store,
            preview,
            ui,
            policy,
            lead_time: Duration::minutes(DEFAULT_LEAD_TIME_MINUTES),
        }
    }

    pub fn with_lead_time(mut self, lead_time: Duration) -> Self {
        self.lead_time = lead_time;
        self
    }

    /// Drive one invocation for `target` (a full URL or an absolute path).
    pub async fn run(&self, target: &str) -> WorkflowOutcome {
        let path = match target_path(target) {
            Ok(path) => path,
            Err(err) => {
                error!(%target, error = %err, "invalid publish target");
                self.ui
                    .acknowledge(
                        "Publish Later",
                        DialogBody::from(format!("Not a valid page URL: {target}")),
                        Severity::Error,
                    )
                    .await;
                return WorkflowOutcome::Failed;
            }
        };

        let mut state = State::Authenticating;
        loop {
            state = match state {
                State::Authenticating => self.authenticate().await,
                State::Loading => self.load(&path).await,
                State::FormOpen { existing } => self.open_form(existing).await,
                State::Submitting { datetime, existing } => {
                    self.submit(&path, datetime, existing).await
                }
                State::Deleting { position } => self.delete(position).await,
                State::Done(outcome) => return outcome,
            };
        }
    }

    async fn authenticate(&self) -> State {
        self.ui.progress("Please wait…").await;
        match self.store.sign_in().await {
            Ok(()) => State::Loading,
            Err(err) => {
                self.ui.progress_done().await;
                error!(error = %err, "could not log into Sharepoint");
                self.ui
                    .acknowledge(
                        "Error",
                        DialogBody::from("Could not log into Sharepoint."),
                        Severity::Error,
                    )
                    .await;
                State::Done(WorkflowOutcome::Failed)
            }
        }
    }

    async fn load(&self, path: &str) -> State {
        match self.store.load().await {
            Ok(table) => {
                self.ui.progress_done().await;
                State::FormOpen {
                    existing: table.find_job(path),
                }
            }
            Err(err) => {
                self.ui.progress_done().await;
                error!(error = %err, "could not retrieve cron jobs");
                self.ui
                    .acknowledge(
                        "Error",
                        DialogBody::from("Could not retrieve cron jobs."),
                        Severity::Error,
                    )
                    .await;
                State::Done(WorkflowOutcome::Failed)
            }
        }
    }

    async fn open_form(&self, existing: Option<JobMatch>) -> State {
        let min_datetime = self.policy.now() + self.lead_time;

        // A malformed existing row only loses the pre-fill, not the workflow.
        let prefill = existing.as_ref().and_then(|found| {
            codec::decode(&found.row)
                .map(|entry| entry.datetime)
                .map_err(|err| error!(error = %err, "failed to parse existing schedule"))
                .ok()
        });
        let locked = prefill.is_some_and(|dt| dt < min_datetime);

        let form = ScheduleForm {
            existing: prefill,
            min_datetime,
            locked,
            timezone: self.policy.label(),
        };

        match self.ui.schedule_form(&form).await {
            FormOutcome::Submit(datetime) => {
                if locked || datetime < min_datetime {
                    self.ui
                        .acknowledge(
                            "Publish Later",
                            DialogBody::from(format!(
                                "The scheduled time must be at least {} minutes from now.",
                                self.lead_time.num_minutes()
                            )),
                            Severity::Error,
                        )
                        .await;
                    return State::Done(WorkflowOutcome::Failed);
                }
                State::Submitting {
                    datetime,
                    existing: existing.map(|found| found.position),
                }
            }
            FormOutcome::Delete => match existing {
                Some(found) => State::Deleting {
                    position: found.position,
                },
                // Nothing to delete; treat like a dismissal.
                None => State::Done(WorkflowOutcome::Cancelled),
            },
            FormOutcome::Cancel => State::Done(WorkflowOutcome::Cancelled),
        }
    }

    async fn submit(
        &self,
        path: &str,
        datetime: NaiveDateTime,
        existing: Option<usize>,
    ) -> State {
        self.ui.progress("Publishing schedule…").await;
        let entry = ScheduleEntry::new(datetime, path);

        let written = match existing {
            Some(position) => self.store.update_job(position, &entry).await,
            None => self.store.add_job(&entry).await,
        };
        // The preview refresh is part of the same step: its failure is
        // reported as a create/update failure.
        let result = match written {
            Ok(()) => self
                .preview
                .refresh(&self.store.json_path())
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        self.ui.progress_done().await;

        match result {
            Ok(()) => {
                info!(
                    path = %entry.path,
                    datetime = %datetime,
                    utc = %self.policy.to_utc(datetime),
                    "publishing scheduled"
                );
                self.ui
                    .notify("Publishing scheduled successfully.", Severity::Success)
                    .await;
                State::Done(WorkflowOutcome::Completed)
            }
            Err(err) => {
                let message = if existing.is_some() {
                    error!(error = %err, "failed to update publishing job");
                    "Failed to update existing publishing schedule."
                } else {
                    error!(error = %err, "failed to create publishing job");
                    "Failed to create publishing schedule."
                };
                self.ui
                    .acknowledge("Publish Later", DialogBody::from(message), Severity::Error)
                    .await;
                State::Done(WorkflowOutcome::Failed)
            }
        }
    }

    async fn delete(&self, position: usize) -> State {
        let confirmed = self
            .ui
            .confirm(
                "Delete schedule",
                DialogBody::from("Are you sure you want to delete this publishing schedule?"),
            )
            .await;
        if !confirmed {
            return State::Done(WorkflowOutcome::Cancelled);
        }

        self.ui.progress("Deleting schedule…").await;
        let result = match self.store.delete_job(position).await {
            Ok(()) => self
                .preview
                .refresh(&self.store.json_path())
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        self.ui.progress_done().await;

        match result {
            Ok(()) => {
                info!(position, "publishing job deleted");
                self.ui
                    .notify("Publishing job deleted successfully.", Severity::Success)
                    .await;
                State::Done(WorkflowOutcome::Completed)
            }
            Err(err) => {
                error!(error = %err, "failed to delete publishing job");
                self.ui
                    .acknowledge(
                        "Publish Later",
                        DialogBody::from("Failed to delete existing publishing schedule."),
                        Severity::Error,
                    )
                    .await;
                State::Done(WorkflowOutcome::Failed)
            }
        }
    }
}

/// Absolute path of a target given either a full URL or a bare path.
pub fn target_path(target: &str) -> Result<String, url::ParseError> {
    if target.starts_with('/') {
        return Ok(target.to_string());
    }
    Ok(url::Url::parse(target)?.path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_path_strips_host_and_query() {
        assert_eq!(
            target_path("https://example.com/news/foo?x=1#top").unwrap(),
            "/news/foo"
        );
    }

    #[test]
    fn target_path_keeps_bare_paths() {
        assert_eq!(target_path("/news/foo").unwrap(), "/news/foo");
    }

    #[test]
    fn target_path_rejects_garbage() {
        assert!(target_path("not a url").is_err());
    }
}
