//! HTTP fetcher backed by `reqwest`.

use super::validate_url;
use crate::JsonFetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

const USER_AGENT_VALUE: &str = concat!("dcs-downloads/", env!("CARGO_PKG_VERSION"));

/// Fetches JSON over HTTP(S).
///
/// Requests carry a fixed user agent and are never retried; a request takes
/// as long as the server takes to answer.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    name: String,
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .or_raise(|| ErrorKind::Network("failed to create HTTP client".to_string()))?;
        Ok(Self {
            name: "http".to_string(),
            client,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(level = "debug", skip(self), fields(fetcher = %self.name))]
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let parsed = validate_url(url)?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .or_raise(|| ErrorKind::Network(url.to_string()))?;
        let status = response.status();
        tracing::debug!(%status, "Received response");
        if status == StatusCode::NOT_FOUND {
            exn::bail!(ErrorKind::NotFound(url.to_string()));
        }
        if !status.is_success() {
            exn::bail!(ErrorKind::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.or_raise(|| ErrorKind::Network(url.to_string()))?;
        serde_json::from_slice(&body).or_raise(|| ErrorKind::InvalidJson(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_names_the_package() {
        assert!(USER_AGENT_VALUE.starts_with("dcs-downloads/"));
    }

    #[tokio::test]
    async fn test_rejects_non_http_urls_before_sending() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher.fetch_json("ftp://example.org/links.json").await.unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidUrl("ftp://example.org/links.json".to_string()));
    }
}
