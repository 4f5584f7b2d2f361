//! `data:` URL parsing (RFC 2397, base64 form only).
//!
//! The backend and the drawing surface both hand documents around as
//! `data:<mime>;base64,<payload>` strings.

use crate::error::DataUrlError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    pub fn parse(s: &str) -> Result<Self, DataUrlError> {
        let rest = s.trim().strip_prefix("data:").ok_or(DataUrlError::MissingScheme)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUrlError::NotBase64)?;
        let mime = meta.strip_suffix(";base64").ok_or(DataUrlError::NotBase64)?;
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| DataUrlError::Base64(e.to_string()))?;
        Ok(Self {
            mime: mime.to_ascii_lowercase(),
            bytes,
        })
    }

    /// Decode a bare base64 body (no `data:` prefix), as returned in the
    /// backend's `base64` JSON fields.
    pub fn from_base64(mime: impl Into<String>, payload: &str) -> Result<Self, DataUrlError> {
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| DataUrlError::Base64(e.to_string()))?;
        Ok(Self::new(mime, bytes))
    }

    pub fn to_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}
