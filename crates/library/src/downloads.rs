use crate::manifest::{ExpandOptions, expand};
use dcs_catalog::models::ReleaseEntry;
use dcs_catalog::{AssetGrouper, FoldOutcome, GroupedAssets};
use dcs_fetch::FetcherHandle;
use tracing::instrument;

/// Groups every downloadable asset of `entries`, in order.
///
/// Manifest assets are expanded first and each listed asset is grouped as if
/// the owning entry had attached it directly. Entries without a release
/// contribute nothing; a manifest that fails to load contributes nothing
/// either, without affecting its siblings.
#[instrument(level = "info", skip_all, fields(entries = entries.len()))]
pub async fn downloadable_types(
    fetcher: &FetcherHandle,
    entries: &[ReleaseEntry],
    options: &ExpandOptions,
) -> GroupedAssets {
    let mut grouper = AssetGrouper::new();
    let mut accepted = 0usize;
    for entry in entries {
        for asset in entry.assets() {
            for expanded in expand(fetcher.as_ref(), asset, options).await {
                if let FoldOutcome::Accepted(_) = grouper.add(&expanded, entry) {
                    accepted += 1;
                }
            }
        }
    }
    let grouped = grouper.finish();
    tracing::info!(accepted, records = grouped.set().len(), "Grouped downloadable assets");
    grouped
}
