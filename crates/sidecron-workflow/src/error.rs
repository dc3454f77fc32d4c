use thiserror::Error;

/// Errors from the admin preview/publish endpoint.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The request never completed.
    #[error("admin request failed: {0}")]
    Transport(String),

    /// Non-2xx answer; these are hard failures for the step that awaited
    /// them.
    #[error("admin returned {status} for {url}")]
    Status { status: u16, url: String },
}
