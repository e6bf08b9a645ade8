use serde::{Deserialize, Serialize};

/// A single downloadable file attached to a release.
///
/// Deserializes from the catalog API shape (`browser_download_url`) as well
/// as the shorter `download_url`/`downloadUrl` spellings used by hand-written
/// manifests. Missing fields default to empty; the grouping engine skips
/// assets without a name or URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "browser_download_url", alias = "download_url", alias = "downloadUrl")]
    pub download_url: String,
    #[serde(default)]
    pub size: u64,
}
impl Asset {
    pub fn new(name: impl Into<String>, download_url: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            download_url: download_url.into(),
            size,
        }
    }
}

/// Release attached to a catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// One version (branch or tag) of one content package in the catalog.
///
/// Multiple entries for the same `full_name` make up the package's version
/// history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseEntry {
    /// `owner/name`
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub branch_or_tag_name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    /// Release timestamp as reported by the catalog.
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub release: Option<Release>,
}
impl ReleaseEntry {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, branch_or_tag_name: impl Into<String>) -> Self {
        let owner = owner.into();
        let name = name.into();
        Self {
            full_name: format!("{owner}/{name}"),
            owner,
            name,
            branch_or_tag_name: branch_or_tag_name.into(),
            ..Default::default()
        }
    }

    pub fn with_assets(mut self, assets: impl IntoIterator<Item = Asset>) -> Self {
        self.release.get_or_insert_with(Release::default).assets.extend(assets);
        self
    }

    /// Release assets in catalog order; empty when the entry has no release.
    pub fn assets(&self) -> &[Asset] {
        self.release.as_ref().map(|release| release.assets.as_slice()).unwrap_or_default()
    }

    pub fn reference(&self) -> EntryRef {
        EntryRef {
            full_name: self.full_name.clone(),
            branch_or_tag_name: self.branch_or_tag_name.clone(),
        }
    }
}

/// Lightweight back-reference from a grouped record to the entry it came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct EntryRef {
    pub full_name: String,
    pub branch_or_tag_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(r#"{"name":"a.pdf","browser_download_url":"https://x/a.pdf","size":12}"#)]
    #[case(r#"{"name":"a.pdf","download_url":"https://x/a.pdf","size":12}"#)]
    #[case(r#"{"name":"a.pdf","downloadUrl":"https://x/a.pdf","size":12}"#)]
    fn test_asset_url_spellings(#[case] json: &str) {
        let asset: Asset = serde_json::from_str(json).unwrap();
        assert_eq!(asset, Asset::new("a.pdf", "https://x/a.pdf", 12));
    }

    #[test]
    fn test_asset_missing_fields_default() {
        let asset: Asset = serde_json::from_str(r#"{"browser_download_url":"https://x/a.pdf"}"#).unwrap();
        assert_eq!(asset.name, "");
        assert_eq!(asset.size, 0);
    }

    #[test]
    fn test_entry_from_catalog_json() {
        let json = r#"{
            "full_name": "unfoldingWord/en_ult",
            "owner": "unfoldingWord",
            "name": "en_ult",
            "branch_or_tag_name": "v40",
            "language": "en",
            "title": null,
            "release": {"assets": [
                {"name": "en_ult_v40.pdf", "browser_download_url": "https://x/en_ult_v40.pdf", "size": 5}
            ]}
        }"#;
        let entry: ReleaseEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.assets().len(), 1);
        assert_eq!(entry.language.as_deref(), Some("en"));
        assert_eq!(entry.title, None);
        assert_eq!(entry.reference().branch_or_tag_name, "v40");
    }

    #[test]
    fn test_entry_without_release_has_no_assets() {
        let entry: ReleaseEntry = serde_json::from_str(r#"{"full_name":"o/r","release":null}"#).unwrap();
        assert!(entry.assets().is_empty());
    }

    #[test]
    fn test_entry_builder() {
        let entry = ReleaseEntry::new("owner", "repo", "v1").with_assets([Asset::new("a", "https://x/a", 1)]);
        assert_eq!(entry.full_name, "owner/repo");
        assert_eq!(entry.assets().len(), 1);
    }
}
