pub mod client;
mod downloads;
pub mod error;
pub mod history;
pub mod manifest;

pub use crate::client::CatalogClient;
pub use crate::downloads::downloadable_types;
pub use crate::history::{VersionDownloads, select_versions, version_history};
pub use crate::manifest::{ExpandOptions, expand};
