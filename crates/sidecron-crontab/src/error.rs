use thiserror::Error;

/// A crontab row that cannot be read back as a schedule entry.
///
/// Parse failures are never fatal to a whole table: callers that only need
/// the entry for display log the error and treat the row as "no prior
/// schedule".
#[derive(Debug, Error)]
pub enum ParseError {
    /// The when-expression does not match the crontab grammar.
    #[error("when-expression does not match the crontab grammar: {0:?}")]
    Grammar(String),

    /// The month name is not in the fixed 12-entry list.
    #[error("unknown month name: {0:?}")]
    UnknownMonth(String),

    /// Fields matched the grammar but do not form a real calendar time.
    #[error("invalid calendar time: {year:04}-{month:02}-{day:02} {hour:02}:{minute:02}")]
    BadDate {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    },
}

/// Errors from the remote tabular store.
///
/// There is no retry at this layer; failures propagate to the workflow,
/// which owns the user messaging.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Sign-in against the store's identity provider failed.
    #[error("sign-in failed: {0}")]
    Auth(String),

    /// The request never completed (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered with a non-success status.
    #[error("store returned {status} ({context})")]
    Status { status: u16, context: String },
}
