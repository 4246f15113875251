//! Single-shot HTTP fetcher.
//!
//! One GET per call with a fixed timeout. No retries: a failed source is
//! reported once and the caller moves on without it.

use reqwest::{header, Client};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::HttpConfig;

/// Expected body format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Json,
    Text,
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
}

impl Payload {
    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }
}

/// Fetch failure for one address
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, timeout or body read failure
    #[error("Request to '{url}' failed: {message}")]
    Transport { url: String, message: String },

    /// Non-2xx response
    #[error("Request to '{url}' returned status {status}")]
    Status { url: String, status: u16 },

    /// Body was not valid JSON
    #[error("Response from '{url}' is not valid JSON: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Parse { url, .. } => url,
        }
    }
}

/// Fetch primitive used by the pipeline
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &str, kind: PayloadKind) -> Result<Payload, FetchError>;

    /// Fetch, turning any failure into an absent payload
    async fn fetch_or_absent(&self, url: &str, kind: PayloadKind) -> Option<Payload> {
        match self.fetch(url, kind).await {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("{}, skipping source", e);
                None
            }
        }
    }
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&config.user_agent)?,
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, kind: PayloadKind) -> Result<Payload, FetchError> {
        debug!("GET {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(transport)?;
        debug!("{} bytes from {}", body.len(), url);

        decode_body(url, body, kind)
    }
}

/// Decode a response body into the requested payload kind
pub fn decode_body(url: &str, body: String, kind: PayloadKind) -> Result<Payload, FetchError> {
    match kind {
        PayloadKind::Text => Ok(Payload::Text(body)),
        PayloadKind::Json => serde_json::from_str(&body)
            .map(Payload::Json)
            .map_err(|source| FetchError::Parse {
                url: url.to_string(),
                source,
            }),
    }
}
