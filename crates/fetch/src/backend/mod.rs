//! JSON fetcher trait and implementations.
//!
//! Everything the catalog crates read over the network is a JSON document:
//! catalog API responses and the link manifests attached to releases. The
//! [`JsonFetcher`] trait is the single seam for that I/O, so the grouping
//! pipeline can run against canned documents in tests.

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "http")]
pub use self::http::HttpFetcher;
#[cfg(feature = "mock")]
pub use self::mock::MockFetcher;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Unified interface for fetching JSON documents.
///
/// # Examples
///
/// ```
/// use dcs_fetch::{JsonFetcher, error::Result};
///
/// async fn count_items(fetcher: &dyn JsonFetcher, url: &str) -> Result<usize> {
///     let value = fetcher.fetch_json(url).await?;
///     Ok(value.as_array().map(Vec::len).unwrap_or(1))
/// }
/// ```
#[async_trait]
pub trait JsonFetcher: Send + Sync {
    /// Name of the fetcher, used for logging only.
    fn name(&self) -> &str;

    /// Fetch and parse the JSON document at `url`.
    ///
    /// Returns [`InvalidUrl`](crate::error::ErrorKind::InvalidUrl) for anything
    /// that is not an absolute `http(s)` URL, and
    /// [`InvalidJson`](crate::error::ErrorKind::InvalidJson)
    /// when the body does not parse.
    async fn fetch_json(&self, url: &str) -> Result<Value>;
}

/// Parses `url`, accepting only absolute `http` and `https` URLs.
#[cfg(any(feature = "http", feature = "mock", test))]
pub(crate) fn validate_url(url: &str) -> Result<url::Url> {
    use crate::error::ErrorKind;
    use exn::ResultExt;
    use url::Url;

    let parsed = Url::parse(url).or_raise(|| ErrorKind::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        exn::bail!(ErrorKind::InvalidUrl(url.to_string()));
    }
    Ok(parsed)
}
