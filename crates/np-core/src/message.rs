//! Typed messages from the drawing surface.
//!
//! The surface posts JSON envelopes `{"type": ..., "data": ...}`. They are
//! decoded exactly once, here, into a `SurfaceMessage`; nothing downstream
//! inspects raw JSON.

use crate::data_url::DataUrl;
use crate::error::MessageError;
use serde::{Deserialize, Serialize};

/// Which stage of the signing pipeline failed on the surface side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Capture,
    Encoding,
    Upload,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Capture => "capture",
            Self::Encoding => "encoding",
            Self::Upload => "upload",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "capture" => Some(Self::Capture),
            "encoding" => Some(Self::Encoding),
            "upload" => Some(Self::Upload),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceMessage {
    /// The bare ink layer, PNG-encoded.
    Signature(Vec<u8>),
    /// Document and ink flattened into one PNG.
    CompositeResult(Vec<u8>),
    Error(ErrorKind),
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<String>,
}

const SIGNATURE: &str = "signature";
const COMPOSITE: &str = "compositeResult";
/// Name used by older surfaces for the flattened document.
const COMPOSITE_LEGACY: &str = "combinedPdf";
const ERROR: &str = "error";

impl SurfaceMessage {
    pub fn decode(json: &str) -> Result<Self, MessageError> {
        let env: Envelope = serde_json::from_str(json)?;
        match env.kind.as_str() {
            SIGNATURE => {
                let data = env.data.ok_or(MessageError::MissingData(SIGNATURE))?;
                Ok(Self::Signature(DataUrl::parse(&data)?.bytes))
            }
            COMPOSITE | COMPOSITE_LEGACY => {
                let data = env.data.ok_or(MessageError::MissingData(COMPOSITE))?;
                Ok(Self::CompositeResult(DataUrl::parse(&data)?.bytes))
            }
            ERROR => {
                let data = env.data.ok_or(MessageError::MissingData(ERROR))?;
                ErrorKind::parse(&data)
                    .map(Self::Error)
                    .ok_or(MessageError::UnknownErrorKind(data))
            }
            other => Err(MessageError::UnknownType(other.to_string())),
        }
    }

    pub fn encode(&self) -> String {
        let env = match self {
            Self::Signature(bytes) => Envelope {
                kind: SIGNATURE.to_string(),
                data: Some(DataUrl::new("image/png", bytes.clone()).to_url()),
            },
            Self::CompositeResult(bytes) => Envelope {
                kind: COMPOSITE.to_string(),
                data: Some(DataUrl::new("image/png", bytes.clone()).to_url()),
            },
            Self::Error(kind) => Envelope {
                kind: ERROR.to_string(),
                data: Some(kind.as_str().to_string()),
            },
        };
        // Envelope holds only strings; serialization cannot fail.
        serde_json::to_string(&env).unwrap_or_default()
    }
}
