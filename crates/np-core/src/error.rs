//! Error types shared across the NP crates.

use std::path::PathBuf;
use thiserror::Error;

/// A pointer sample that cannot become ink. Never fatal: capture drops the
/// point and keeps going.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    /// NaN or infinite coordinate
    #[error("non-finite pointer coordinate ({x}, {y})")]
    NonFinite { x: f64, y: f64 },

    /// Coordinate outside the input surface
    #[error("pointer ({x}, {y}) outside input surface {width}x{height}")]
    OutOfBounds {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },

    /// Input surface has no area, so no ratio can be computed
    #[error("input surface {width}x{height} has zero area")]
    EmptyInputSurface { width: u32, height: u32 },
}

/// Failure to produce the flattened output image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// Document surface has zero width or height
    #[error("cannot composite onto a {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },

    /// Ink raster does not match the document surface
    #[error("ink layer is {ink_width}x{ink_height} but document is {width}x{height}")]
    SizeMismatch {
        width: u32,
        height: u32,
        ink_width: u32,
        ink_height: u32,
    },

    /// The image codec rejected the pixels
    #[error("image codec failed: {0}")]
    Codec(String),

    /// Encoder produced no bytes
    #[error("encoder produced an empty buffer")]
    EmptyOutput,
}

/// Failure reported by an upload sink.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Backend answered with a non-success status
    #[error("upload rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Request never completed
    #[error("upload transport failed: {0}")]
    Transport(String),

    /// Nothing to upload yet
    #[error("no composite image to upload")]
    NothingToUpload,
}

/// Failure to turn a document source into a pixel surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Source kind this renderer cannot rasterize
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),

    /// Source bytes are corrupt
    #[error("failed to decode document: {0}")]
    Decode(String),

    /// Renderer produced (or was asked for) a zero-area surface
    #[error("document rendered to an empty {width}x{height} surface")]
    EmptySurface { width: u32, height: u32 },

    /// Source given as an unreadable data URL
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),
}

/// Malformed `data:` URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataUrlError {
    #[error("missing `data:` scheme")]
    MissingScheme,

    #[error("only base64 data URLs are supported")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Base64(String),
}

/// Problem decoding a message coming from the drawing surface.
#[derive(Error, Debug)]
pub enum MessageError {
    /// Envelope is not valid JSON
    #[error("malformed message envelope: {0}")]
    Json(#[from] serde_json::Error),

    /// Envelope `type` not recognised
    #[error("unknown message type {0:?}")]
    UnknownType(String),

    /// Required `data` field absent
    #[error("message {0:?} has no data")]
    MissingData(&'static str),

    /// Unrecognised error kind in an `error` message
    #[error("unknown error kind {0:?}")]
    UnknownErrorKind(String),

    /// Payload is not a usable data URL
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),
}

/// Loading, saving, or validating the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("config I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid configuration document
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required field is blank
    #[error("configuration field `{0}` is required")]
    Missing(&'static str),

    /// API endpoint is not an http(s) URL
    #[error("API endpoint must start with http:// or https://, got {0:?}")]
    InvalidEndpoint(String),
}
