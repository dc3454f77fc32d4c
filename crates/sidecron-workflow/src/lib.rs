//! `sidecron-workflow` — the publish-later workflow and its companions.
//!
//! # Overview
//!
//! [`publish_later::PublishLaterWorkflow`] drives one scheduling invocation
//! as an explicit state machine:
//!
//! ```text
//! Idle → Authenticating → Loading → FormOpen → {Submitting | Deleting} → Done | Failed
//! ```
//!
//! Each state handler returns the next state; `Done` and `Failed` both hand
//! control back to the caller, so nothing survives an invocation. The user
//! sits behind the [`ui::Interaction`] trait — the form is a suspension point
//! with no timeout. [`status::StatusAnnotator`] is the read-only companion
//! that reuses the same store and codec without ever mutating anything, and
//! [`admin::AdminClient`] refreshes the JSON projection of the crontab after
//! every mutation.

pub mod admin;
pub mod error;
pub mod publish_later;
pub mod status;
pub mod ui;

pub use admin::{AdminClient, PreviewTrigger};
pub use error::AdminError;
pub use publish_later::{target_path, PublishLaterWorkflow, WorkflowOutcome};
pub use status::StatusAnnotator;
pub use ui::{DialogBody, FormOutcome, Interaction, ScheduleForm, Severity};
