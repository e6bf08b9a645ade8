//! Link manifest expansion.
//!
//! A release may attach a small JSON document (`links.json`, `files.json`,
//! ...) instead of, or alongside, real files. Its body is an object or an
//! array of objects shaped like release assets, and each of those takes the
//! manifest's place when grouping. Manifests may list further manifests, up
//! to [`ExpandOptions::max_depth`] levels deep.
//!
//! Expansion never fails: a manifest that cannot be fetched or parsed is
//! logged and contributes no assets.

use dcs_catalog::models::Asset;
use dcs_config::Config;
use dcs_fetch::JsonFetcher;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashSet;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Lowercase asset name suffixes that mark a manifest.
    pub manifest_suffixes: Vec<String>,
    /// Manifests nested deeper than this are dropped.
    pub max_depth: usize,
}
impl ExpandOptions {
    /// Whether `name` (case-insensitively) ends with a manifest suffix.
    ///
    /// ```
    /// use dcs_library::ExpandOptions;
    /// let options = ExpandOptions::default();
    /// assert!(options.is_manifest("Release-Links.JSON"));
    /// assert!(!options.is_manifest("en_ult_v40.pdf"));
    /// ```
    pub fn is_manifest(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.manifest_suffixes.iter().any(|suffix| !suffix.is_empty() && name.ends_with(suffix.as_str()))
    }
}
impl From<&Config> for ExpandOptions {
    fn from(config: &Config) -> Self {
        Self {
            manifest_suffixes: config.manifest_suffixes.iter().map(|suffix| suffix.trim().to_lowercase()).collect(),
            max_depth: config.max_manifest_depth,
        }
    }
}
impl Default for ExpandOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Replaces a manifest asset by the assets it lists; any other asset is
/// returned unchanged.
///
/// Listed entries without a download URL are skipped. Entries without a name
/// are named after the last path segment of their URL.
#[instrument(level = "debug", skip(fetcher, asset, options), fields(name = %asset.name))]
pub async fn expand(fetcher: &dyn JsonFetcher, asset: &Asset, options: &ExpandOptions) -> Vec<Asset> {
    let mut visited = HashSet::new();
    expand_inner(fetcher, asset.clone(), options, 0, &mut visited).await
}

fn expand_inner<'a>(
    fetcher: &'a dyn JsonFetcher,
    asset: Asset,
    options: &'a ExpandOptions,
    depth: usize,
    visited: &'a mut HashSet<String>,
) -> BoxFuture<'a, Vec<Asset>> {
    Box::pin(async move {
        if !options.is_manifest(&asset.name) {
            return vec![asset];
        }
        if depth >= options.max_depth {
            tracing::warn!(
                name = %asset.name,
                url = %asset.download_url,
                depth,
                "Manifest nested too deeply, skipping"
            );
            return Vec::new();
        }
        if !visited.insert(asset.download_url.clone()) {
            tracing::warn!(name = %asset.name, url = %asset.download_url, "Manifest already expanded, skipping");
            return Vec::new();
        }
        tracing::debug!(name = %asset.name, url = %asset.download_url, fetcher = fetcher.name(), "Fetching manifest");
        let body = match fetcher.fetch_json(&asset.download_url).await {
            Ok(body) => body,
            Err(err) => {
                tracing::error!(
                    name = %asset.name,
                    url = %asset.download_url,
                    error = ?err,
                    "Failed to fetch manifest"
                );
                return Vec::new();
            },
        };
        let mut expanded = Vec::new();
        for listed in listed_assets(body, &asset.download_url) {
            expanded.extend(expand_inner(fetcher, listed, options, depth + 1, visited).await);
        }
        expanded
    })
}

/// Assets listed in a manifest body; a single object counts as a one-element
/// list.
fn listed_assets(body: Value, manifest_url: &str) -> Vec<Asset> {
    let items = match body {
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Asset>(item) {
            Ok(asset) => Some(asset),
            Err(err) => {
                tracing::warn!(url = manifest_url, %err, "Skipping malformed manifest entry");
                None
            },
        })
        .filter(|asset| {
            if asset.download_url.is_empty() {
                tracing::debug!(
                    url = manifest_url,
                    name = %asset.name,
                    "Skipping manifest entry without a download URL"
                );
            }
            !asset.download_url.is_empty()
        })
        .map(|mut asset| {
            if asset.name.is_empty() {
                asset.name = asset.download_url.rsplit('/').next().unwrap_or_default().to_string();
            }
            asset
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcs_fetch::backend::MockFetcher;
    use dcs_fetch::error::ErrorKind as FetchErrorKind;
    use rstest::rstest;
    use serde_json::json;

    const LINKS: &str = "https://git.door43.org/o/r/releases/download/v1/links.json";

    fn manifest(name: &str, url: &str) -> Asset {
        Asset::new(name, url, 120)
    }

    #[rstest]
    #[case("links.json", true)]
    #[case("release-links.json", true)]
    #[case("LINK.JSON", true)]
    #[case("assets.json", true)]
    #[case("attachments.json", true)]
    #[case("files.json", true)]
    #[case("links.json.zip", false)]
    #[case("manifest.json", false)]
    #[case("links", false)]
    fn test_is_manifest(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(ExpandOptions::default().is_manifest(name), expected);
    }

    #[test]
    fn test_options_from_config_normalize_suffixes() {
        let config = Config {
            manifest_suffixes: vec![" Downloads.JSON ".into()],
            max_manifest_depth: 2,
            ..Config::default()
        };
        let options = ExpandOptions::from(&config);
        assert_eq!(options.manifest_suffixes, ["downloads.json"]);
        assert_eq!(options.max_depth, 2);
        assert!(options.is_manifest("my-downloads.json"));
        assert!(!options.is_manifest("links.json"));
    }

    #[tokio::test]
    async fn test_non_manifest_passes_through_without_fetching() {
        let fetcher = MockFetcher::default();
        let asset = Asset::new("en_ult_v1.pdf", "https://x/en_ult_v1.pdf", 10);
        let expanded = expand(&fetcher, &asset, &ExpandOptions::default()).await;
        assert_eq!(expanded, [asset]);
        assert!(fetcher.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_single_object_is_one_element_list() {
        let fetcher = MockFetcher::with_responses([(
            LINKS,
            json!({"name": "Website", "browser_download_url": "https://example.org/r"}),
        )]);
        let expanded = expand(&fetcher, &manifest("release-links.json", LINKS), &ExpandOptions::default()).await;
        assert_eq!(expanded, [Asset::new("Website", "https://example.org/r", 0)]);
    }

    #[tokio::test]
    async fn test_array_entries_are_normalized() {
        let fetcher = MockFetcher::with_responses([(
            LINKS,
            json!([
                {"name": "Watch", "downloadUrl": "https://www.youtube.com/watch?v=abc"},
                {"download_url": "https://cdn.example.org/media/en_obs_v6_mp4_720p.zip", "size": 2048},
                {"name": "No URL"},
                "not an object"
            ]),
        )]);
        let expanded = expand(&fetcher, &manifest("links.json", LINKS), &ExpandOptions::default()).await;
        assert_eq!(
            expanded,
            [
                Asset::new("Watch", "https://www.youtube.com/watch?v=abc", 0),
                Asset::new("en_obs_v6_mp4_720p.zip", "https://cdn.example.org/media/en_obs_v6_mp4_720p.zip", 2048),
            ]
        );
    }

    #[rstest]
    #[case(FetchErrorKind::Network("connection reset".into()))]
    #[case(FetchErrorKind::InvalidJson(LINKS.into()))]
    #[case(FetchErrorKind::Status { url: LINKS.into(), status: 500 })]
    #[tokio::test]
    async fn test_fetch_failure_yields_nothing(#[case] kind: FetchErrorKind) {
        let fetcher = MockFetcher::default().with_failure(LINKS, kind);
        let expanded = expand(&fetcher, &manifest("links.json", LINKS), &ExpandOptions::default()).await;
        assert!(expanded.is_empty());
        assert_eq!(fetcher.requests().await, [LINKS]);
    }

    #[tokio::test]
    async fn test_nested_manifests_expand_in_order() {
        let fetcher = MockFetcher::with_responses([
            (
                "https://x/links.json",
                json!([
                    {"name": "a.pdf", "browser_download_url": "https://x/a.pdf"},
                    {"name": "more-files.json", "browser_download_url": "https://x/more-files.json"},
                    {"name": "c.pdf", "browser_download_url": "https://x/c.pdf"}
                ]),
            ),
            ("https://x/more-files.json", json!([{"name": "b.pdf", "browser_download_url": "https://x/b.pdf"}])),
        ]);
        let root = manifest("links.json", "https://x/links.json");
        let expanded = expand(&fetcher, &root, &ExpandOptions::default()).await;
        let names: Vec<_> = expanded.iter().map(|asset| asset.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[tokio::test]
    async fn test_depth_limit_drops_deeper_manifests() {
        let fetcher = MockFetcher::with_responses([
            (
                "https://x/links.json",
                json!([
                    {"name": "a.pdf", "browser_download_url": "https://x/a.pdf"},
                    {"name": "more-files.json", "browser_download_url": "https://x/more-files.json"}
                ]),
            ),
            ("https://x/more-files.json", json!([{"name": "b.pdf", "browser_download_url": "https://x/b.pdf"}])),
        ]);
        let options = ExpandOptions {
            max_depth: 1,
            ..ExpandOptions::default()
        };
        let expanded = expand(&fetcher, &manifest("links.json", "https://x/links.json"), &options).await;
        assert_eq!(expanded, [Asset::new("a.pdf", "https://x/a.pdf", 0)]);
        assert_eq!(fetcher.requests().await, ["https://x/links.json"]);
    }

    #[tokio::test]
    async fn test_self_referencing_manifest_is_fetched_once() {
        let fetcher = MockFetcher::with_responses([(
            "https://x/links.json",
            json!([
                {"name": "links.json", "browser_download_url": "https://x/links.json"},
                {"name": "a.pdf", "browser_download_url": "https://x/a.pdf"}
            ]),
        )]);
        let root = manifest("links.json", "https://x/links.json");
        let expanded = expand(&fetcher, &root, &ExpandOptions::default()).await;
        assert_eq!(expanded, [Asset::new("a.pdf", "https://x/a.pdf", 0)]);
        assert_eq!(fetcher.requests().await, ["https://x/links.json"]);
    }
}
