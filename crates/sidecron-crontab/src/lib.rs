//! `sidecron-crontab` — the spreadsheet-backed publish-later job list.
//!
//! # Overview
//!
//! Jobs live in a remote workbook table, one row per job, two text cells per
//! row. The [`codec`] module translates between schedule entries and the
//! crontab row grammar, [`table::JobTable`] resolves the at-most-one row
//! for a page path, and [`store::CrontabStore`] is the capability-restricted
//! adapter over whatever [`store::TableStore`] backend holds the rows.
//!
//! # Row grammar
//!
//! | Cell   | Format                                           |
//! |--------|--------------------------------------------------|
//! | when   | `at HH:MM on the D day of <MonthName> in YYYY`   |
//! | action | `publish <absolute-path>`                        |
//!
//! The grammar is persisted data: it must keep decoding rows written by
//! earlier versions of the tooling.

pub mod codec;
pub mod error;
pub mod store;
pub mod table;

pub use error::{ParseError, StoreError};
pub use store::{CrontabStore, TableStore};
pub use table::{JobMatch, JobRow, JobTable};
