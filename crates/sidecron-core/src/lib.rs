//! `sidecron-core` — shared types, configuration and constants for the
//! publish-later tooling.
//!
//! Everything here is plain data: the [`types::ScheduleEntry`] that the rest
//! of the workspace schedules, encodes and resolves, the explicit
//! [`types::TimezonePolicy`] applied at every wall-clock boundary, and the
//! figment-backed [`config::SidecronConfig`].

pub mod config;
pub mod error;
pub mod types;

pub use config::SidecronConfig;
pub use error::{CoreError, Result};
pub use types::{ScheduleEntry, TimezonePolicy};
