//! Catalog API client.
//!
//! Every catalog endpoint answers with `{"data": [...]}`; the client unwraps
//! that envelope into typed rows. Filters come from [`Config`]: subjects and
//! owners restrict every query, the stage is always sent.

use crate::error::{ErrorKind, Result};
use dcs_catalog::models::ReleaseEntry;
use dcs_config::Config;
use dcs_fetch::FetcherHandle;
use exn::ResultExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::form_urlencoded::byte_serialize;

/// A language with published content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageInfo {
    /// Language code.
    pub lc: String,
    /// Name in the language itself.
    #[serde(default)]
    pub ln: String,
    /// Anglicized name.
    #[serde(default)]
    pub ang: String,
    /// Text direction, `ltr` or `rtl`.
    #[serde(default)]
    pub ld: Option<String>,
}

/// An organization or user publishing content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerInfo {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
}
impl OwnerInfo {
    /// The full name, followed by the username in parentheses unless the
    /// full name already reads as the username.
    ///
    /// ```
    /// use dcs_library::client::OwnerInfo;
    /// let owner = OwnerInfo { username: "unfoldingWord".into(), full_name: "unfoldingWord®".into() };
    /// assert_eq!(owner.display_name(), "unfoldingWord®");
    /// let owner = OwnerInfo { username: "wa".into(), full_name: "Wycliffe Associates".into() };
    /// assert_eq!(owner.display_name(), "Wycliffe Associates (wa)");
    /// ```
    pub fn display_name(&self) -> String {
        if self.full_name.is_empty() {
            return self.username.clone();
        }
        let slug: String = self
            .full_name
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'))
            .collect();
        if slug == self.username.to_lowercase() {
            self.full_name.clone()
        } else {
            format!("{} ({})", self.full_name, self.username)
        }
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default)]
    data: Vec<T>,
}

/// Builds `key=v1,v2&...` with keys and joined values percent-encoded.
/// Keys without values are left out.
///
/// ```
/// use dcs_library::client::build_query_string;
/// let langs = vec!["en".to_string(), "fr".to_string()];
/// let query = build_query_string(&[("lang", &langs), ("owner", &[]), ("stage", &["prod".to_string()])]);
/// assert_eq!(query, "lang=en%2Cfr&stage=prod");
/// ```
pub fn build_query_string(pairs: &[(&str, &[String])]) -> String {
    pairs
        .iter()
        .filter(|(_, values)| values.iter().any(|value| !value.is_empty()))
        .map(|(key, values)| {
            let joined = values.join(",");
            let key: String = byte_serialize(key.as_bytes()).collect();
            let value: String = byte_serialize(joined.as_bytes()).collect();
            format!("{key}={value}")
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Typed queries against the catalog API.
pub struct CatalogClient {
    fetcher: FetcherHandle,
    config: Config,
}
impl CatalogClient {
    pub fn new(fetcher: FetcherHandle, config: Config) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fetcher(&self) -> &FetcherHandle {
        &self.fetcher
    }

    fn stage(&self) -> Vec<String> {
        vec![self.config.stage.clone()]
    }

    async fn get_data<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &[String])]) -> Result<Vec<T>> {
        let query = build_query_string(query);
        let url = match query.is_empty() {
            true => self.config.api_url(endpoint),
            false => format!("{}?{query}", self.config.api_url(endpoint)),
        };
        tracing::debug!(%url, "Querying catalog");
        let body = self.fetcher.fetch_json(&url).await.map_err(ErrorKind::fetch)?;
        let envelope: Envelope<T> =
            serde_json::from_value(body).or_raise(|| ErrorKind::InvalidResponse(url.clone()))?;
        Ok(envelope.data)
    }

    /// Languages with content, limited to the configured languages when any
    /// are set.
    #[instrument(level = "debug", skip(self))]
    pub async fn languages(&self) -> Result<Vec<LanguageInfo>> {
        let stage = self.stage();
        let query: [(&str, &[String]); 3] = [
            ("owner", &self.config.owners),
            ("subject", &self.config.subjects),
            ("stage", &stage),
        ];
        let languages: Vec<LanguageInfo> = self.get_data("catalog/list/languages", &query).await?;
        if self.config.languages.is_empty() {
            return Ok(languages);
        }
        Ok(languages.into_iter().filter(|language| self.config.languages.contains(&language.lc)).collect())
    }

    /// Owners publishing in `lang`.
    #[instrument(level = "debug", skip(self))]
    pub async fn owners(&self, lang: &str) -> Result<Vec<OwnerInfo>> {
        let (lang, stage) = (vec![lang.to_string()], self.stage());
        let query: [(&str, &[String]); 4] = [
            ("subject", &self.config.subjects),
            ("lang", &lang),
            ("owner", &self.config.owners),
            ("stage", &stage),
        ];
        self.get_data("catalog/list/owners", &query).await
    }

    /// Latest entry of every package `owner` publishes in `lang`, by title.
    #[instrument(level = "debug", skip(self))]
    pub async fn entries(&self, lang: &str, owner: &str) -> Result<Vec<ReleaseEntry>> {
        let (lang, owner, stage) = (vec![lang.to_string()], vec![owner.to_string()], self.stage());
        let (sort, order) = (vec!["title".to_string()], vec!["asc".to_string()]);
        let query: [(&str, &[String]); 6] = [
            ("subject", &self.config.subjects),
            ("lang", &lang),
            ("owner", &owner),
            ("stage", &stage),
            ("sort", &sort),
            ("order", &order),
        ];
        self.get_data("catalog/search", &query).await
    }

    /// Every released version of `owner/repo`, newest first.
    #[instrument(level = "debug", skip(self))]
    pub async fn history(&self, owner: &str, repo: &str) -> Result<Vec<ReleaseEntry>> {
        let (owner, repo, stage) = (vec![owner.to_string()], vec![repo.to_string()], self.stage());
        let (include, sort, order) = (vec!["1".to_string()], vec!["released".to_string()], vec!["desc".to_string()]);
        let query: [(&str, &[String]); 6] = [
            ("owner", &owner),
            ("repo", &repo),
            ("includeHistory", &include),
            ("sort", &sort),
            ("order", &order),
            ("stage", &stage),
        ];
        self.get_data("catalog/search", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dcs_fetch::backend::MockFetcher;
    use dcs_fetch::error::ErrorKind as FetchErrorKind;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::Arc;

    const API: &str = "https://git.door43.org/api/v1";

    fn client(mock: &Arc<MockFetcher>, config: Config) -> CatalogClient {
        CatalogClient::new(mock.clone(), config)
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[rstest]
    #[case(&[], "")]
    #[case(&[("stage", &["prod"][..])], "stage=prod")]
    #[case(
        &[("subject", &["Bible", "Open Bible Stories"][..]), ("stage", &["prod"][..])],
        "subject=Bible%2COpen+Bible+Stories&stage=prod"
    )]
    #[case(&[("owner", &[][..]), ("lang", &[""][..]), ("q", &["a&b=c"][..])], "q=a%26b%3Dc")]
    fn test_build_query_string(#[case] pairs: &[(&str, &[&str])], #[case] expected: &str) {
        let owned: Vec<(&str, Vec<String>)> = pairs.iter().map(|(key, values)| (*key, strings(values))).collect();
        let borrowed: Vec<(&str, &[String])> = owned.iter().map(|(key, values)| (*key, values.as_slice())).collect();
        assert_eq!(build_query_string(&borrowed), expected);
    }

    #[tokio::test]
    async fn test_languages_filtered_by_config() {
        let mock = Arc::new(MockFetcher::with_responses([(
            format!("{API}/catalog/list/languages?stage=prod"),
            json!({"data": [
                {"lc": "en", "ln": "English", "ang": "English", "ld": "ltr"},
                {"lc": "fr", "ln": "français", "ang": "French"},
                {"lc": "ar", "ln": "العربية", "ang": "Arabic", "ld": "rtl"}
            ]}),
        )]));
        let all = client(&mock, Config::default()).languages().await.unwrap();
        assert_eq!(all.len(), 3);
        let config = Config {
            languages: strings(&["fr", "ar"]),
            ..Config::default()
        };
        let some = client(&mock, config).languages().await.unwrap();
        let codes: Vec<_> = some.iter().map(|language| language.lc.as_str()).collect();
        assert_eq!(codes, ["fr", "ar"]);
        assert_eq!(some[0].ld, None);
    }

    #[tokio::test]
    async fn test_owners_query() {
        let url = format!("{API}/catalog/list/owners?subject=Bible&lang=en&owner=unfoldingWord%2Cwa&stage=preprod");
        let mock = Arc::new(MockFetcher::with_responses([(
            url.clone(),
            json!({"data": [{"username": "unfoldingWord", "full_name": "unfoldingWord"}, {"username": "wa"}]}),
        )]));
        let config = Config {
            subjects: strings(&["Bible"]),
            owners: strings(&["unfoldingWord", "wa"]),
            stage: "preprod".into(),
            ..Config::default()
        };
        let owners = client(&mock, config).owners("en").await.unwrap();
        assert_eq!(owners.len(), 2);
        assert_eq!(owners[1].display_name(), "wa");
        assert_eq!(mock.requests().await, [url]);
    }

    #[tokio::test]
    async fn test_entries_query() {
        let url = format!("{API}/catalog/search?lang=en&owner=unfoldingWord&stage=prod&sort=title&order=asc");
        let mock = Arc::new(MockFetcher::with_responses([(
            url,
            json!({"data": [{
                "full_name": "unfoldingWord/en_ult",
                "owner": "unfoldingWord",
                "name": "en_ult",
                "branch_or_tag_name": "v40",
                "release": {"assets": [
                    {"name": "en_ult_v40.pdf", "browser_download_url": "https://x/en_ult_v40.pdf", "size": 7}
                ]}
            }]}),
        )]));
        let entries = client(&mock, Config::default()).entries("en", "unfoldingWord").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].assets()[0].size, 7);
    }

    #[tokio::test]
    async fn test_history_query() {
        let url = format!(
            "{API}/catalog/search?owner=unfoldingWord&repo=en_ult&includeHistory=1&sort=released&order=desc&stage=prod"
        );
        let mock = Arc::new(MockFetcher::with_responses([(url.clone(), json!({"data": []}))]));
        let entries = client(&mock, Config::default()).history("unfoldingWord", "en_ult").await.unwrap();
        assert!(entries.is_empty());
        assert_eq!(mock.requests().await, [url]);
    }

    #[tokio::test]
    async fn test_missing_data_is_empty() {
        let url = format!("{API}/catalog/list/languages?stage=prod");
        let mock = Arc::new(MockFetcher::with_responses([(url, json!({}))]));
        assert!(client(&mock, Config::default()).languages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_invalid_response() {
        let mock = Arc::new(MockFetcher::with_responses([(
            format!("{API}/catalog/list/languages?stage=prod"),
            json!({"data": "nope"}),
        )]));
        let err = client(&mock, Config::default()).languages().await.unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidResponse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_its_kind() {
        let url = format!("{API}/catalog/list/owners?lang=en&stage=prod");
        let mock = Arc::new(MockFetcher::default().with_failure(
            url.clone(),
            FetchErrorKind::Status {
                url: url.clone(),
                status: 502,
            },
        ));
        let err = client(&mock, Config::default()).owners("en").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Fetch(FetchErrorKind::Status { status: 502, .. })));
        assert!(err.is_retryable());
    }
}
