//! Asset grouping: folds release assets into a deduplicated, categorized set.
//!
//! Every asset is classified from its file name alone:
//!
//! 1. Names outside the `<project>_<resource>_v<version>_<info>.<ext>` grammar
//!    are **links**, keyed by the host of their download URL and versioned by
//!    the owning entry's branch or tag.
//! 2. `mp3`/`mp4` files with a `<chapter>_<quality>` info part are **chapters**
//!    and are filed under a synthesized parent archive
//!    (`<key>_v<version>_<ext>_<quality>.zip`).
//! 3. `zip` files with a `<mp3|mp4|3gpp>_<quality>` info part are the
//!    **parent archive itself**, and fill in a synthesized parent with the
//!    same name if its chapters arrived first.
//! 4. Everything else is a **typed asset**, categorized by its format tag.
//!
//! Each path rejects an incoming asset when a record it considers the same
//! asset already holds a newer version, and only at insertion time. Once
//! accepted, a record only leaves the set when a newer record with exactly the
//! same identity (key, quality, extension and format) is accepted after it.

use crate::models::{Asset, CategorizedAssetSet, Category, FormatRecord, RecordKind, ReleaseEntry};
use dcs_format::{FileParts, MediaParts, classify, file_extension, parse_file_name, parse_media_suffix};
use std::collections::HashMap;
use tracing::instrument;
use url::Url;

/// Where a registered download URL lives inside a [`CategorizedAssetSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordLocation {
    pub category: Category,
    /// Index of the top-level record within its category.
    pub position: usize,
    /// Index within the top-level record's chapters, for chapter records.
    pub chapter: Option<usize>,
}

/// Download URL to record index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadIndex(HashMap<String, RecordLocation>);
impl DownloadIndex {
    pub fn get(&self, url: &str) -> Option<RecordLocation> {
        self.0.get(url).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn register(&mut self, url: &str, location: RecordLocation) {
        self.0.insert(url.to_string(), location);
    }

    /// Recomputes every location pointing into `category` after records were
    /// removed or chapters re-sorted. URLs since claimed by another category
    /// keep pointing there.
    fn reindex(&mut self, category: Category, records: &[FormatRecord]) {
        self.0.retain(|_, location| location.category != category);
        for (position, record) in records.iter().enumerate() {
            let chapters = record.chapters().iter().enumerate().map(|(i, chapter)| (chapter, Some(i)));
            for (record, chapter) in std::iter::once((record, None)).chain(chapters) {
                let Some(url) = record.download_url() else {
                    continue;
                };
                if self.0.get(url).is_none_or(|existing| existing.category == category) {
                    self.register(url, RecordLocation { category, position, chapter });
                }
            }
        }
    }
}

/// Result of a fold: the categorized records plus the index of every
/// accepted download URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedAssets {
    set: CategorizedAssetSet,
    downloads: DownloadIndex,
}
impl GroupedAssets {
    pub fn set(&self) -> &CategorizedAssetSet {
        &self.set
    }

    pub fn into_set(self) -> CategorizedAssetSet {
        self.set
    }

    pub fn downloads(&self) -> &DownloadIndex {
        &self.downloads
    }

    /// Resolves a download URL to the record (or chapter) that owns it.
    pub fn lookup(&self, url: &str) -> Option<&FormatRecord> {
        let location = self.downloads.get(url)?;
        let record = self.set.get(location.category).get(location.position)?;
        match location.chapter {
            Some(chapter) => record.chapters().get(chapter),
            None => Some(record),
        }
    }
}

/// What happened to a single asset passed to [`AssetGrouper::add`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldOutcome {
    /// Added as a new record, or attached to an existing one.
    Accepted(Category),
    /// A record for the same asset with a newer (or, for links, equal)
    /// version is already present.
    Outdated { category: Category, newer_version: String },
    /// The asset has no name or no download URL.
    MissingField(&'static str),
}

/// Stateful grouping engine. Feed assets in order with [`add`](Self::add),
/// then take the result with [`finish`](Self::finish).
///
/// State is scoped to one grouper; folding unrelated batches needs a fresh
/// grouper per batch (or [`fold`]).
#[derive(Debug, Default)]
pub struct AssetGrouper {
    grouped: GroupedAssets,
}
impl AssetGrouper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn finish(self) -> GroupedAssets {
        self.grouped
    }

    /// Folds one asset, owned by `entry`, into the set.
    pub fn add(&mut self, asset: &Asset, entry: &ReleaseEntry) -> FoldOutcome {
        if asset.name.is_empty() {
            tracing::debug!(url = %asset.download_url, "Skipping asset without a name");
            return FoldOutcome::MissingField("name");
        }
        if asset.download_url.is_empty() {
            tracing::debug!(name = %asset.name, "Skipping asset without a download URL");
            return FoldOutcome::MissingField("download_url");
        }
        let outcome = match parse_file_name(&asset.name) {
            None => self.add_link(asset, entry),
            Some(parts) => match parse_media_suffix(&parts.info) {
                Some(media) if matches!(parts.extension.as_str(), "mp3" | "mp4") => {
                    self.add_chapter(asset, entry, parts, media)
                },
                Some(media) if parts.extension == "zip" => self.add_media_archive(asset, entry, parts, media),
                _ => self.add_typed(asset, entry, parts),
            },
        };
        if let FoldOutcome::Outdated { category, newer_version } = &outcome {
            tracing::debug!(
                name = %asset.name,
                %category,
                newer_version,
                "Skipping asset superseded by a newer version"
            );
        }
        outcome
    }

    fn add_link(&mut self, asset: &Asset, entry: &ReleaseEntry) -> FoldOutcome {
        let host = Url::parse(&asset.download_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();
        let category = if host.contains("door43.org") { Category::Text } else { Category::Other };
        let version = entry.branch_or_tag_name.as_str();
        let records = self.grouped.set.get(category);
        if let Some(newer) = records.iter().find(|r| r.grouping_key == host && r.version_tag.as_str() >= version) {
            return outdated(category, newer);
        }
        let record = FormatRecord {
            source_entry: entry.reference(),
            display_name: asset.name.clone(),
            extension: file_extension(&asset.name.to_lowercase()).unwrap_or_default().to_string(),
            mime_tag: classify(&asset.name),
            grouping_key: host,
            quality_tier: String::new(),
            version_tag: version.to_string(),
            asset: Some(asset.clone()),
            kind: RecordKind::Plain,
        };
        self.push(category, record);
        FoldOutcome::Accepted(category)
    }

    fn add_chapter(&mut self, asset: &Asset, entry: &ReleaseEntry, parts: FileParts, media: MediaParts) -> FoldOutcome {
        let category = if parts.extension == "mp4" { Category::Video } else { Category::Audio };
        let key = parts.grouping_key();
        let parent_name = format!("{key}_v{}_{}_{}.zip", parts.version, parts.extension, media.quality);
        let records = self.grouped.set.get(category);
        if let Some(newer) = records
            .iter()
            .find(|r| r.grouping_key == key && r.quality_tier == media.quality && r.version_tag > parts.version)
        {
            return outdated(category, newer);
        }
        let position = match records.iter().position(|r| r.display_name.eq_ignore_ascii_case(&parent_name)) {
            Some(position) => position,
            None => {
                let parent = FormatRecord {
                    source_entry: entry.reference(),
                    mime_tag: classify(&parent_name),
                    display_name: parent_name,
                    extension: "zip".to_string(),
                    grouping_key: key.clone(),
                    quality_tier: media.quality.clone(),
                    version_tag: parts.version.clone(),
                    asset: None,
                    kind: RecordKind::Archive { chapters: Vec::new() },
                };
                self.push(category, parent)
            },
        };
        let chapter = FormatRecord {
            source_entry: entry.reference(),
            display_name: asset.name.clone(),
            extension: parts.extension,
            mime_tag: classify(&asset.name),
            grouping_key: key,
            quality_tier: media.quality,
            version_tag: parts.version,
            asset: Some(asset.clone()),
            kind: RecordKind::Chapter { identifier: media.token },
        };
        let records = self.grouped.set.get_mut(category);
        let chapters = records[position].chapters_mut();
        chapters.push(chapter);
        // Lexicographic on the identifier string, so "10" sorts before "9".
        chapters.sort_by(|a, b| a.identifier().cmp(&b.identifier()));
        self.grouped.downloads.reindex(category, records);
        let chapter = records[position]
            .chapters()
            .iter()
            .position(|c| c.download_url() == Some(asset.download_url.as_str()));
        self.grouped.downloads.register(&asset.download_url, RecordLocation { category, position, chapter });
        FoldOutcome::Accepted(category)
    }

    fn add_media_archive(
        &mut self,
        asset: &Asset,
        entry: &ReleaseEntry,
        parts: FileParts,
        media: MediaParts,
    ) -> FoldOutcome {
        let category = if media.is_video_token() { Category::Video } else { Category::Audio };
        let key = parts.grouping_key();
        let format = classify(&asset.name);
        let records = self.grouped.set.get(category);
        if let Some(newer) = records.iter().find(|r| {
            r.grouping_key == key
                && r.mime_tag == format
                && r.quality_tier == media.quality
                && r.version_tag > parts.version
        }) {
            return outdated(category, newer);
        }
        let waiting =
            records.iter().position(|r| r.asset.is_none() && r.display_name.eq_ignore_ascii_case(&asset.name));
        let position = match waiting {
            Some(position) => {
                let record = &mut self.grouped.set.get_mut(category)[position];
                record.display_name = asset.name.clone();
                record.asset = Some(asset.clone());
                position
            },
            None => {
                let record = FormatRecord {
                    source_entry: entry.reference(),
                    display_name: asset.name.clone(),
                    extension: parts.extension,
                    mime_tag: format,
                    grouping_key: key,
                    quality_tier: media.quality,
                    version_tag: parts.version,
                    asset: Some(asset.clone()),
                    kind: RecordKind::Archive { chapters: Vec::new() },
                };
                self.push(category, record)
            },
        };
        self.grouped.downloads.register(&asset.download_url, RecordLocation { category, position, chapter: None });
        FoldOutcome::Accepted(category)
    }

    fn add_typed(&mut self, asset: &Asset, entry: &ReleaseEntry, parts: FileParts) -> FoldOutcome {
        let format = classify(&asset.name);
        let category = Category::for_format(&format);
        let key = parts.grouping_key();
        let records = self.grouped.set.get(category);
        if let Some(newer) = records.iter().find(|r| {
            r.grouping_key == key
                && r.extension == parts.extension
                && r.mime_tag == format
                && r.version_tag > parts.version
        }) {
            return outdated(category, newer);
        }
        let record = FormatRecord {
            source_entry: entry.reference(),
            display_name: asset.name.clone(),
            extension: parts.extension,
            mime_tag: format,
            grouping_key: key,
            quality_tier: String::new(),
            version_tag: parts.version,
            asset: Some(asset.clone()),
            kind: RecordKind::Plain,
        };
        self.push(category, record);
        FoldOutcome::Accepted(category)
    }

    /// Appends a new top-level record, drops strictly older records with the
    /// same identity and registers the record's URL. Returns its position.
    fn push(&mut self, category: Category, record: FormatRecord) -> usize {
        let records = self.grouped.set.get_mut(category);
        let before = records.len();
        records.retain(|existing| {
            let superseded = existing.same_identity(&record) && existing.version_tag < record.version_tag;
            if superseded {
                tracing::debug!(
                    name = %existing.display_name,
                    version = %existing.version_tag,
                    newer_version = %record.version_tag,
                    "Dropping record superseded by a newer version"
                );
            }
            !superseded
        });
        if records.len() != before {
            self.grouped.downloads.reindex(category, records);
        }
        let url = record.download_url().map(str::to_string);
        records.push(record);
        let position = records.len() - 1;
        if let Some(url) = url {
            self.grouped.downloads.register(&url, RecordLocation { category, position, chapter: None });
        }
        position
    }
}

fn outdated(category: Category, newer: &FormatRecord) -> FoldOutcome {
    FoldOutcome::Outdated {
        category,
        newer_version: newer.version_tag.clone(),
    }
}

/// Folds `(asset, owning entry)` pairs, in order, into a fresh set.
///
/// ```
/// use dcs_catalog::{fold, models::{Asset, Category, ReleaseEntry}};
/// let entry = ReleaseEntry::new("owner", "en_ulb", "v2");
/// let assets = [
///     Asset::new("en_ulb_v2_full.pdf", "https://x/en_ulb_v2_full.pdf", 10),
///     Asset::new("en_ulb_v1_full.pdf", "https://x/en_ulb_v1_full.pdf", 10),
/// ];
/// let grouped = fold(assets.iter().map(|asset| (asset, &entry)));
/// assert_eq!(grouped.set().get(Category::Text).len(), 1);
/// assert_eq!(grouped.set().text[0].version_tag, "2");
/// ```
#[instrument(level = "debug", skip_all)]
pub fn fold<'a>(assets: impl IntoIterator<Item = (&'a Asset, &'a ReleaseEntry)>) -> GroupedAssets {
    let mut grouper = AssetGrouper::new();
    for (asset, entry) in assets {
        grouper.add(asset, entry);
    }
    grouper.finish()
}
