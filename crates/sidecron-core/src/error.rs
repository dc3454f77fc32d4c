use thiserror::Error;

/// Errors produced by the core configuration layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Config file missing, unreadable or failing validation.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
