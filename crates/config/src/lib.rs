//! Layered configuration.
//!
//! Values are merged, lowest to highest precedence, from:
//!
//! 1. built-in defaults ([`Config::default`]);
//! 2. a config file: the one passed to [`Config::load`], or else any of
//!    `config.toml`, `config.yaml`, `config.yml` and `config.json` found in
//!    the platform config directory;
//! 3. environment variables prefixed with `DCS_` (`DCS_CATALOG_URL`,
//!    `DCS_LANGUAGES=[en,fr]`, ...).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

pub const ENV_PREFIX: &str = "DCS_";
pub const DEFAULT_CATALOG_URL: &str = "https://git.door43.org";
pub const DEFAULT_API_PATH: &str = "api/v1";
pub const DEFAULT_STAGE: &str = "prod";
/// Release asset name suffixes that mark a JSON manifest of further assets.
pub const DEFAULT_MANIFEST_SUFFIXES: [&str; 5] =
    ["links.json", "link.json", "assets.json", "attachments.json", "files.json"];
pub const DEFAULT_MAX_MANIFEST_DEPTH: usize = 3;

const CONFIG_FILE_STEM: &str = "config";
const CONFIG_FILE_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the catalog server.
    pub catalog_url: String,
    /// API prefix below `catalog_url`.
    pub api_path: String,
    /// Catalog publishing stage (`prod`, `preprod`, `draft`, `latest`).
    pub stage: String,
    /// Restrict catalog queries to these subjects. Empty means all.
    pub subjects: Vec<String>,
    /// Restrict catalog queries to these owners. Empty means all.
    pub owners: Vec<String>,
    /// Restrict the language list to these language codes. Empty means all.
    pub languages: Vec<String>,
    /// Case-insensitive asset name suffixes treated as link manifests.
    pub manifest_suffixes: Vec<String>,
    /// How many manifests deep a manifest may reference further manifests.
    pub max_manifest_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            stage: DEFAULT_STAGE.to_string(),
            subjects: Vec::new(),
            owners: Vec::new(),
            languages: Vec::new(),
            manifest_suffixes: DEFAULT_MANIFEST_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            max_manifest_depth: DEFAULT_MAX_MANIFEST_DEPTH,
        }
    }
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// With `path`, only that file is read (and it must exist); otherwise the
    /// platform config directory is searched.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let files = match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
                }
                vec![path.to_path_buf()]
            },
            None => default_files(),
        };
        Self::from_figment(Self::figment(&files)?)
    }

    /// Layered provider chain over `files`, without extracting it.
    pub fn figment(files: &[PathBuf]) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        for file in files {
            tracing::debug!(path = %file.display(), "Merging config file");
            let extension = file.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => return Err(exn::Exn::from(ErrorKind::UnsupportedFormat(file.clone()))),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().or_raise(|| ErrorKind::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.catalog_url)
            .or_raise(|| ErrorKind::Invalid(format!("catalog_url is not a URL: {}", self.catalog_url)))?;
        if url.host_str().is_none_or(str::is_empty) {
            exn::bail!(ErrorKind::Invalid(format!("catalog_url has no host: {}", self.catalog_url)));
        }
        if self.manifest_suffixes.iter().all(|suffix| suffix.trim().is_empty()) {
            exn::bail!(ErrorKind::Invalid("manifest_suffixes must not be empty".to_string()));
        }
        if self.max_manifest_depth < 1 {
            exn::bail!(ErrorKind::Invalid("max_manifest_depth must be at least 1".to_string()));
        }
        Ok(())
    }

    /// `catalog_url` without a trailing slash, used as the origin when
    /// describing records.
    pub fn origin(&self) -> &str {
        self.catalog_url.trim_end_matches('/')
    }

    /// Absolute URL of an API endpoint (`catalog/search`, ...), without a
    /// query string.
    pub fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}/{}", self.origin(), self.api_path.trim_matches('/'), endpoint.trim_start_matches('/'))
    }
}

fn default_files() -> Vec<PathBuf> {
    let Some(dirs) = ProjectDirs::from("org", "door43", "dcs-downloads") else {
        tracing::debug!("No home directory, skipping config files");
        return Vec::new();
    };
    CONFIG_FILE_EXTENSIONS
        .iter()
        .map(|ext| dirs.config_dir().join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .filter(|path| path.is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.manifest_suffixes.len(), 5);
        assert_eq!(config.api_url("catalog/search"), "https://git.door43.org/api/v1/catalog/search");
    }

    #[test]
    fn test_defaults_without_any_layer() {
        Jail::expect_with(|_jail| {
            let config = Config::from_figment(Config::figment(&[]).unwrap()).unwrap();
            assert_eq!(config, Config::default());
            Ok(())
        });
    }

    #[rstest]
    #[case("config.toml", "stage = \"preprod\"\nlanguages = [\"en\", \"fr\"]\n")]
    #[case("config.yaml", "stage: preprod\nlanguages: [en, fr]\n")]
    #[case("config.json", r#"{"stage": "preprod", "languages": ["en", "fr"]}"#)]
    fn test_file_layer(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let config = Config::load(Some(Path::new(name))).unwrap();
            assert_eq!(config.stage, "preprod");
            assert_eq!(config.languages, ["en", "fr"]);
            assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "catalog_url = \"https://qa.door43.org\"\nstage = \"preprod\"\n")?;
            jail.set_env("DCS_STAGE", "draft");
            jail.set_env("DCS_MAX_MANIFEST_DEPTH", "5");
            let config = Config::load(Some(Path::new("config.toml"))).unwrap();
            assert_eq!(config.catalog_url, "https://qa.door43.org");
            assert_eq!(config.stage, "draft");
            assert_eq!(config.max_manifest_depth, 5);
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        Jail::expect_with(|_jail| {
            let err = Config::load(Some(Path::new("nope.toml"))).unwrap_err();
            assert!(matches!(*err, ErrorKind::NotFound(_)));
            Ok(())
        });
    }

    #[test]
    fn test_unsupported_extension() {
        Jail::expect_with(|jail| {
            jail.create_file("config.ini", "stage = preprod")?;
            let err = Config::load(Some(Path::new("config.ini"))).unwrap_err();
            assert!(matches!(*err, ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "max_manifest_depth = \"deep\"")?;
            let err = Config::load(Some(Path::new("config.toml"))).unwrap_err();
            assert!(matches!(*err, ErrorKind::Parse));
            Ok(())
        });
    }

    #[rstest]
    #[case(Config { catalog_url: "not a url".into(), ..Config::default() })]
    #[case(Config { catalog_url: "file:///tmp/catalog".into(), ..Config::default() })]
    #[case(Config { manifest_suffixes: vec![], ..Config::default() })]
    #[case(Config { manifest_suffixes: vec![" ".into()], ..Config::default() })]
    #[case(Config { max_manifest_depth: 0, ..Config::default() })]
    fn test_validate_rejects(#[case] config: Config) {
        let err = config.validate().unwrap_err();
        assert!(matches!(*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_api_url_trims_slashes() {
        let config = Config {
            catalog_url: "https://example.org/".into(),
            api_path: "/api/v1/".into(),
            ..Config::default()
        };
        assert_eq!(config.origin(), "https://example.org");
        assert_eq!(config.api_url("/catalog/list/owners"), "https://example.org/api/v1/catalog/list/owners");
    }
}
