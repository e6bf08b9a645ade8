//! Release entry models, the asset grouping engine and display labels.
//!
//! [`fold`] turns the assets of one or more catalog entries into a
//! deduplicated [`CategorizedAssetSet`](models::CategorizedAssetSet), and
//! [`describe`] renders each grouped record for display.

mod describe;
mod group;
pub mod models;

pub use crate::describe::{Description, Icon, describe};
pub use crate::group::{AssetGrouper, DownloadIndex, FoldOutcome, GroupedAssets, RecordLocation, fold};
