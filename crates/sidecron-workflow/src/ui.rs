use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Body content for a dialog: either fixed text or a callback rendered when
/// the dialog opens.
pub enum DialogBody {
    Static(String),
    Callback(Box<dyn Fn() -> String + Send + Sync>),
}

impl DialogBody {
    pub fn render(&self) -> String {
        match self {
            DialogBody::Static(text) => text.clone(),
            DialogBody::Callback(f) => f(),
        }
    }
}

impl From<&str> for DialogBody {
    fn from(text: &str) -> Self {
        DialogBody::Static(text.to_string())
    }
}

impl From<String> for DialogBody {
    fn from(text: String) -> Self {
        DialogBody::Static(text)
    }
}

impl std::fmt::Debug for DialogBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogBody::Static(text) => f.debug_tuple("Static").field(text).finish(),
            DialogBody::Callback(_) => f.debug_tuple("Callback").finish(),
        }
    }
}

/// Styling hint for notifications and acknowledgments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// What the user did with the schedule form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    /// Schedule (or re-schedule) for the given wall-clock time.
    Submit(NaiveDateTime),
    /// Remove the existing schedule.
    Delete,
    /// Dismissed without action; nothing is mutated.
    Cancel,
}

/// Everything the interaction surface needs to render the schedule form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleForm {
    /// Pre-filled datetime from the existing schedule, if one was found and
    /// decoded.
    pub existing: Option<NaiveDateTime>,
    /// Earliest selectable time (now + lead time).
    pub min_datetime: NaiveDateTime,
    /// The existing schedule already passed the minimum: submission is
    /// disabled, only delete and cancel remain available.
    pub locked: bool,
    /// Timezone the wall-clock times are expressed in, for display.
    pub timezone: &'static str,
}

/// The user-facing surface the workflow talks to.
///
/// Implementations decide how things look (modal dialogs, terminal prompts);
/// the workflow only decides when they appear. `schedule_form` and `confirm`
/// are suspension points with no timeout — the workflow waits until the user
/// acts.
#[async_trait]
pub trait Interaction: Send + Sync {
    /// Open a progress indicator. A later `progress_done` closes it; the
    /// workflow guarantees one is never left open on any exit path.
    async fn progress(&self, message: &str);

    /// Close the current progress indicator, if any.
    async fn progress_done(&self);

    /// Transient notification, dismissed automatically.
    async fn notify(&self, message: &str, severity: Severity);

    /// Blocking message the user must acknowledge.
    async fn acknowledge(&self, title: &str, body: DialogBody, severity: Severity);

    /// Yes/no question; `false` on dismissal.
    async fn confirm(&self, title: &str, body: DialogBody) -> bool;

    /// Show the schedule form and wait for the user's decision.
    async fn schedule_form(&self, form: &ScheduleForm) -> FormOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_body_renders_verbatim() {
        assert_eq!(DialogBody::from("hello").render(), "hello");
    }

    #[test]
    fn callback_body_renders_lazily() {
        let body = DialogBody::Callback(Box::new(|| "computed".to_string()));
        assert_eq!(body.render(), "computed");
    }
}
