//! Talking to the sales backend.
//!
//! `BackendClient` covers the REST endpoints the signing flow needs and
//! doubles as the production `UploadSink`. `submit` ties a finished
//! `SigningSession` to any sink.

pub mod error;
pub mod http;
pub mod submit;
pub mod upload;

pub use error::{ClientError, SubmitError};
pub use http::BackendClient;
pub use submit::{retry_upload, submit};
pub use upload::UploadSink;
