//! Connection parameters and signing defaults.
//!
//! Loaded once at start-up and passed by value to whatever needs it. The
//! file on disk is pretty-printed JSON; absent fields take their defaults.

use crate::error::ConfigError;
use crate::geometry::SurfaceSize;
use crate::model::InkStyle;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the sales backend, e.g. `http://10.0.0.5:8000`.
    pub api_url: String,
    /// Branch identifier (`filial`).
    pub branch: String,
    /// Point-of-sale terminal identifier (`pdv`).
    pub terminal: String,
    /// Pen used for every signature.
    pub ink: InkStyle,
    /// Size the document is rendered at before signing.
    pub document_size: SurfaceSize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            branch: String::new(),
            terminal: String::new(),
            ink: InkStyle::default(),
            // A4 portrait at 72 dpi.
            document_size: SurfaceSize::new(595, 842),
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("saved config to {}", path.display());
        Ok(())
    }

    /// All connection fields present and the endpoint looks like a URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Missing("api_url"));
        }
        if self.branch.trim().is_empty() {
            return Err(ConfigError::Missing("branch"));
        }
        if self.terminal.trim().is_empty() {
            return Err(ConfigError::Missing("terminal"));
        }
        let url = self.api_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(url.to_string()));
        }
        Ok(())
    }

    /// Endpoint without a trailing slash, ready for path concatenation.
    pub fn endpoint(&self) -> &str {
        self.api_url.trim().trim_end_matches('/')
    }
}

/// Maintenance code that unlocks configuration editing: the date as `YYYYMMDD`.
pub fn unlock_code(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

pub fn check_unlock_code(input: &str, date: NaiveDate) -> bool {
    input.trim() == unlock_code(date)
}

/// Today's code in local time.
pub fn today_unlock_code() -> String {
    unlock_code(chrono::Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AppConfig {
        AppConfig {
            api_url: "http://10.0.0.5:8000/".into(),
            branch: "1".into(),
            terminal: "3".into(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn validate_requires_every_connection_field() {
        assert!(complete().validate().is_ok());

        let mut c = complete();
        c.branch = "  ".into();
        assert!(matches!(c.validate(), Err(ConfigError::Missing("branch"))));

        let mut c = complete();
        c.api_url = String::new();
        assert!(matches!(c.validate(), Err(ConfigError::Missing("api_url"))));

        let mut c = complete();
        c.api_url = "10.0.0.5:8000".into();
        assert!(matches!(c.validate(), Err(ConfigError::InvalidEndpoint(_))));
    }

    #[test]
    fn endpoint_strips_trailing_slash() {
        assert_eq!(complete().endpoint(), "http://10.0.0.5:8000");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let c: AppConfig = serde_json::from_str(r#"{"api_url":"http://x"}"#).unwrap();
        assert_eq!(c.document_size, SurfaceSize::new(595, 842));
        assert_eq!(c.ink, InkStyle::default());
    }

    #[test]
    fn unlock_code_is_the_date() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(unlock_code(day), "20240307");
        assert!(check_unlock_code(" 20240307 ", day));
        assert!(!check_unlock_code("20240308", day));
    }
}
