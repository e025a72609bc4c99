//! Remote progress sink.
//!
//! The remote service persists progress snapshots. It accepts a JSON
//! [`ProgressUpdate`] and answers with a JSON acknowledgement whose shape this
//! crate does not interpret.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use scormbridge_core::{ProgressUpdate, RuntimeConfig};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Header carrying the anti-forgery token.
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// Errors that can occur while sending an update.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A success answer that is not JSON
    #[error("invalid acknowledgement: {0}")]
    Decode(#[from] serde_json::Error),

    /// An error status without a JSON acknowledgement
    #[error("rejected: {0}")]
    Rejected(String),
}

/// A remote consumer of progress updates.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Send one update and return the acknowledgement.
    async fn send(&self, update: &ProgressUpdate) -> Result<Value, SinkError>;
}

/// Sink posting updates to an HTTP endpoint.
#[derive(Clone)]
pub struct HttpProgressSink {
    /// HTTP client
    client: Client,

    /// Endpoint URL
    url: String,

    /// Anti-forgery token
    csrf_token: Option<String>,
}

impl HttpProgressSink {
    /// Create a sink for `url`.
    pub fn new(url: impl Into<String>, csrf_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: ClientBuilder::new()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            url: url.into(),
            csrf_token,
        }
    }

    /// Create a sink using a preconfigured client.
    pub fn with_client(client: Client, url: impl Into<String>, csrf_token: Option<String>) -> Self {
        Self {
            client,
            url: url.into(),
            csrf_token,
        }
    }

    /// Create a sink from host configuration, or `None` when no endpoint is
    /// configured.
    pub fn from_config(config: &RuntimeConfig) -> Option<Self> {
        config.progress_endpoint().map(|url| {
            Self::new(
                url,
                config.csrf_token.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )
        })
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ProgressSink for HttpProgressSink {
    async fn send(&self, update: &ProgressUpdate) -> Result<Value, SinkError> {
        debug!(
            "Posting progress for slide {} to {}",
            update.current_slide, self.url
        );

        let mut request = self.client.post(&self.url).json(update);
        if let Some(token) = &self.csrf_token {
            request = request.header(CSRF_HEADER, token);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("Progress endpoint answered {}", status);

        // A JSON acknowledgement is returned whatever the status
        let body = response.bytes().await?;
        match serde_json::from_slice::<Value>(&body) {
            Ok(ack) => Ok(ack),
            Err(_) if !status.is_success() => Err(SinkError::Rejected(status.to_string())),
            Err(e) => Err(SinkError::Decode(e)),
        }
    }
}
