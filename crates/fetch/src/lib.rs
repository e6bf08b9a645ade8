pub mod backend;
pub mod error;

pub use crate::backend::JsonFetcher;
use std::sync::Arc;

pub type FetcherHandle = Arc<dyn JsonFetcher + Send + Sync>;
