//! `sidecron-sharepoint` — Microsoft Graph implementation of the crontab
//! table store.
//!
//! [`GraphClient`] speaks the workbook-table subset of the Graph API (range
//! read, row add/update/delete) against a Sharepoint drive and implements
//! `sidecron_crontab::TableStore`. [`SharepointSession`] holds the one shared
//! access token; acquisition is idempotent, so concurrent callers never race
//! into a second sign-in.
//!
//! Errors are reported as `sidecron_crontab::StoreError` — this crate adds no
//! error type of its own.

pub mod client;
pub mod session;

pub use client::GraphClient;
pub use session::SharepointSession;
