//! In-memory fetcher for testing.

use super::validate_url;
use crate::JsonFetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};

#[derive(Debug, Clone)]
enum Canned {
    Json(Value),
    Failure(ErrorKind),
}

/// In-memory fetcher for testing.
///
/// Serves canned JSON documents keyed by exact URL and records every
/// requested URL, in order, so tests can assert which documents were (or
/// were not) fetched. Unknown URLs fail with
/// [`NotFound`](ErrorKind::NotFound).
///
/// # Examples
///
/// ```
/// use dcs_fetch::backend::MockFetcher;
/// use dcs_fetch::JsonFetcher;
/// use serde_json::json;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let fetcher = MockFetcher::with_responses([
///     ("https://example.org/links.json", json!([{"name": "Website", "url": "https://example.org"}])),
/// ]);
/// let links = fetcher.fetch_json("https://example.org/links.json").await.unwrap();
/// assert_eq!(links[0]["name"], "Website");
/// assert_eq!(fetcher.requests().await, ["https://example.org/links.json"]);
/// # }
/// ```
#[derive(Debug)]
pub struct MockFetcher {
    name: String,
    responses: RwLock<HashMap<String, Canned>>,
    requests: Mutex<Vec<String>>,
}

impl MockFetcher {
    /// Create a mock fetcher serving the given documents.
    pub fn with_responses(responses: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        let responses = responses.into_iter().map(|(url, value)| (url.into(), Canned::Json(value))).collect();
        Self {
            name: "mock".to_string(),
            responses: RwLock::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Make requests for `url` fail with `kind`.
    pub fn with_failure(mut self, url: impl Into<String>, kind: ErrorKind) -> Self {
        self.responses.get_mut().insert(url.into(), Canned::Failure(kind));
        self
    }

    /// Change the name of the mock fetcher.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Serve `value` at `url` from now on.
    pub async fn insert(&self, url: impl Into<String>, value: Value) {
        self.responses.write().await.insert(url.into(), Canned::Json(value));
    }

    /// Every URL requested so far, in request order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }
}
impl Default for MockFetcher {
    fn default() -> Self {
        let responses: [(&str, Value); 0] = [];
        Self::with_responses(responses)
    }
}

#[async_trait]
impl JsonFetcher for MockFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.requests.lock().await.push(url.to_string());
        validate_url(url)?;
        match self.responses.read().await.get(url).cloned() {
            Some(Canned::Json(value)) => Ok(value),
            Some(Canned::Failure(kind)) => Err(exn::Exn::from(kind)),
            None => Err(exn::Exn::from(ErrorKind::NotFound(url.to_string()))),
        }
    }
}
