//! Version history of a single package.
//!
//! The catalog lists every released version of a package. Older versions
//! are only worth showing when they offer a file type that no newer version
//! does, so the history is filtered newest-first by the download URL
//! extensions seen so far.

use crate::downloads::downloadable_types;
use crate::manifest::ExpandOptions;
use async_stream::stream;
use dcs_catalog::GroupedAssets;
use dcs_catalog::models::ReleaseEntry;
use dcs_fetch::FetcherHandle;
use futures::Stream;
use std::collections::HashSet;

/// One version worth showing, with its own grouped downloads.
#[derive(Debug, Clone)]
pub struct VersionDownloads {
    pub entry: ReleaseEntry,
    pub downloads: GroupedAssets,
}

/// Text after the last `.` of a download URL (the whole URL when there is
/// none).
fn url_extension(url: &str) -> &str {
    url.rsplit('.').next().unwrap_or_default().trim()
}

/// Entries worth showing, from `entries` ordered newest-first.
///
/// An entry is kept when at least one of its assets has a download URL
/// extension that no kept entry before it had. Entries without assets are
/// never kept.
pub fn select_versions(entries: &[ReleaseEntry]) -> Vec<&ReleaseEntry> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut selected = Vec::new();
    for entry in entries {
        let extensions: Vec<&str> = entry
            .assets()
            .iter()
            .map(|asset| url_extension(&asset.download_url))
            .filter(|ext| !ext.is_empty())
            .collect();
        if !extensions.iter().any(|ext| !seen.contains(ext)) {
            tracing::debug!(
                full_name = %entry.full_name,
                version = %entry.branch_or_tag_name,
                "Hiding version without new file types"
            );
            continue;
        }
        seen.extend(extensions);
        selected.push(entry);
    }
    selected
}

/// Streams the grouped downloads of every version [`select_versions`] keeps,
/// newest-first, grouping each version separately.
pub fn version_history<'a>(
    fetcher: &'a FetcherHandle,
    entries: &'a [ReleaseEntry],
    options: &'a ExpandOptions,
) -> impl Stream<Item = VersionDownloads> + 'a {
    stream! {
        for entry in select_versions(entries) {
            let downloads = downloadable_types(fetcher, std::slice::from_ref(entry), options).await;
            yield VersionDownloads { entry: entry.clone(), downloads };
        }
    }
}
