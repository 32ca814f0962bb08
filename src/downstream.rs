//! Client for the downstream ping service.
//!
//! # Responsibilities
//! - Issue `GET <downstream.url>` through the traced client
//! - Decode `{"message": string}`
//! - Classify failures (transport, status, body, decode)
//!
//! Every failure is surfaced to callers the same way; the variants only
//! matter for logs, spans and metrics.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::DownstreamConfig;
use crate::http::client::TracedClient;
use crate::observability::metrics;

/// Expected downstream body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}

/// Why a downstream call failed.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    #[error("downstream request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("downstream responded with status {0}")]
    Status(StatusCode),

    #[error("failed to read downstream response: {0}")]
    Body(#[source] reqwest::Error),

    #[error("malformed downstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DownstreamError {
    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            DownstreamError::Request(_) => "request",
            DownstreamError::Status(_) => "status",
            DownstreamError::Body(_) => "body",
            DownstreamError::Decode(_) => "decode",
        }
    }
}

/// Errors building the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    #[error("invalid downstream URL '{url}': {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Calls the ping service.
#[derive(Clone, Debug)]
pub struct DownstreamClient {
    http: TracedClient,
    url: Url,
}

impl DownstreamClient {
    pub fn new(config: &DownstreamConfig) -> Result<Self, ClientBuildError> {
        let url = Url::parse(&config.url).map_err(|source| ClientBuildError::Url {
            url: config.url.clone(),
            source,
        })?;

        // the downstream is addressed directly, never through an env proxy
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: TracedClient::new(builder.build()?),
            url,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch and decode the downstream message.
    pub async fn ping(&self) -> Result<PingResponse, DownstreamError> {
        let result = self.fetch().await;
        metrics::record_downstream(match &result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        });
        result
    }

    async fn fetch(&self) -> Result<PingResponse, DownstreamError> {
        let request = self
            .http
            .get(self.url.clone())
            .header(ACCEPT, "application/json")
            .build()
            .map_err(DownstreamError::Request)?;

        let response = self
            .http
            .execute(request)
            .await
            .map_err(DownstreamError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownstreamError::Status(status));
        }

        let body = response.bytes().await.map_err(DownstreamError::Body)?;
        Ok(serde_json::from_slice(&body)?)
    }
}
