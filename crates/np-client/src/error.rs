use np_core::error::{ConfigError, DataUrlError, UploadError};
use np_editor::SessionError;
use thiserror::Error;

/// Errors from backend queries.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration unusable for connecting
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Request failed before a response arrived, or body was unreadable
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response carried an unreadable document payload
    #[error("invalid document payload: {0}")]
    Payload(#[from] DataUrlError),

    /// Caller input rejected before any request was made
    #[error("{0}")]
    InvalidArgument(&'static str),
}

/// Errors from the composite-then-upload pipeline.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Composite worker panicked or was cancelled
    #[error("composite worker failed: {0}")]
    Worker(String),
}
