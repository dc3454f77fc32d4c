//! Terminal rendition of the workflow's interaction surface.
//!
//! The browser tool renders modal dialogs; here every dialog becomes a
//! stdin/stdout exchange. The schedule form keeps the same contract: a
//! datetime bounded below by the minimum lead time, a delete action, and
//! dismissal as the only cancellation path.

use std::io::Write;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};

use sidecron_workflow::ui::{DialogBody, FormOutcome, Interaction, ScheduleForm, Severity};

/// Input format for the schedule prompt, mirroring an HTML
/// `datetime-local` value.
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub struct TerminalUi;

impl TerminalUi {
    pub fn new() -> Self {
        Self
    }

    async fn read_line(&self, prompt: &str) -> String {
        print!("{prompt}");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        if reader.read_line(&mut line).await.is_err() {
            return String::new();
        }
        line.trim().to_string()
    }
}

/// What a line of user input means for the schedule form.
enum InputAction {
    Outcome(FormOutcome),
    Retry(String),
}

fn interpret(input: &str, form: &ScheduleForm) -> InputAction {
    if input.is_empty() {
        return InputAction::Outcome(FormOutcome::Cancel);
    }
    if input.eq_ignore_ascii_case("delete") {
        return InputAction::Outcome(FormOutcome::Delete);
    }
    if form.locked {
        return InputAction::Retry(
            "The existing schedule has already passed; only 'delete' or cancel are available."
                .to_string(),
        );
    }
    match NaiveDateTime::parse_from_str(input, DATETIME_FORMAT) {
        Ok(datetime) if datetime >= form.min_datetime => {
            InputAction::Outcome(FormOutcome::Submit(datetime))
        }
        Ok(_) => InputAction::Retry(format!(
            "The time must be no earlier than {}.",
            form.min_datetime.format(DATETIME_FORMAT)
        )),
        Err(_) => InputAction::Retry(format!(
            "Not a valid time; expected {} (e.g. 2025-03-05T14:30).",
            DATETIME_FORMAT
        )),
    }
}

fn glyph(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "·",
        Severity::Success => "✓",
        Severity::Error => "✗",
    }
}

#[async_trait]
impl Interaction for TerminalUi {
    async fn progress(&self, message: &str) {
        println!("… {message}");
    }

    async fn progress_done(&self) {}

    async fn notify(&self, message: &str, severity: Severity) {
        println!("{} {message}", glyph(severity));
    }

    async fn acknowledge(&self, title: &str, body: DialogBody, severity: Severity) {
        println!("{} {title}: {}", glyph(severity), body.render());
        self.read_line("Press Enter to continue… ").await;
    }

    async fn confirm(&self, title: &str, body: DialogBody) -> bool {
        println!("{title}: {}", body.render());
        loop {
            match self.read_line("[y/n] ").await.to_ascii_lowercase().as_str() {
                "y" | "yes" => return true,
                "n" | "no" | "" => return false,
                _ => {}
            }
        }
    }

    async fn schedule_form(&self, form: &ScheduleForm) -> FormOutcome {
        match form.existing {
            Some(existing) => println!(
                "Currently scheduled for {} ({}).",
                existing.format(DATETIME_FORMAT),
                form.timezone
            ),
            None => println!("No publishing schedule yet."),
        }
        println!(
            "Times are in {}; the earliest allowed is {}.",
            form.timezone,
            form.min_datetime.format(DATETIME_FORMAT)
        );

        let prompt = if form.locked {
            "'delete' to remove the schedule, or Enter to cancel: "
        } else {
            "Publish time (YYYY-MM-DDTHH:MM), 'delete', or Enter to cancel: "
        };
        loop {
            let input = self.read_line(prompt).await;
            match interpret(&input, form) {
                InputAction::Outcome(outcome) => return outcome,
                InputAction::Retry(message) => println!("{message}"),
            }
        }
    }
}
