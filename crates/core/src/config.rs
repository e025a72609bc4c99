//! Host-supplied runtime configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration supplied by the hosting page before content starts.
///
/// A missing `progress_url` turns remote updates into a logged no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Identifier of the launched course, used for log correlation
    #[serde(default)]
    pub interactive_id: Option<String>,

    /// Anti-forgery token sent with every remote update
    #[serde(default)]
    pub csrf_token: Option<String>,

    /// Endpoint receiving progress updates
    #[serde(default)]
    pub progress_url: Option<String>,

    /// Slides in the course
    #[serde(default)]
    pub total_slides: u32,

    /// Mirror runtime log lines through `tracing`
    #[serde(default)]
    pub debug: bool,

    /// Learner id seeded into `cmi.core.student_id`
    #[serde(default)]
    pub student_id: Option<String>,

    /// Learner name seeded into `cmi.core.student_name`
    #[serde(default)]
    pub student_name: Option<String>,

    /// HTTP timeout for remote updates
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            interactive_id: None,
            csrf_token: None,
            progress_url: None,
            total_slides: 0,
            debug: false,
            student_id: None,
            student_name: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// The progress endpoint, treating an empty string as unset.
    pub fn progress_endpoint(&self) -> Option<&str> {
        self.progress_url.as_deref().filter(|url| !url.is_empty())
    }

    /// Set the total slide count.
    pub fn with_total_slides(mut self, total_slides: u32) -> Self {
        self.total_slides = total_slides;
        self
    }

    /// Set the progress endpoint.
    pub fn with_progress_url(mut self, url: impl Into<String>) -> Self {
        self.progress_url = Some(url.into());
        self
    }

    /// Set the anti-forgery token.
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_object() {
        let config = RuntimeConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.progress_endpoint(), None);
    }

    #[test]
    fn test_empty_url_is_unset() {
        let config = RuntimeConfig::default().with_progress_url("");
        assert_eq!(config.progress_endpoint(), None);

        let config = config.with_progress_url("/progress/7/");
        assert_eq!(config.progress_endpoint(), Some("/progress/7/"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "interactive_id": "42",
                "csrf_token": "tok",
                "progress_url": "http://localhost:8000/progress/42/",
                "total_slides": 12,
                "debug": true
            }}"#
        )
        .unwrap();

        let config = RuntimeConfig::load(file.path()).unwrap();
        assert_eq!(config.interactive_id.as_deref(), Some("42"));
        assert_eq!(config.csrf_token.as_deref(), Some("tok"));
        assert_eq!(config.total_slides, 12);
        assert!(config.debug);
    }

    #[test]
    fn test_malformed_config() {
        assert!(matches!(
            RuntimeConfig::from_json_str("{\"total_slides\": \"ten\"}"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            RuntimeConfig::load("/nonexistent/scormbridge.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
