mod category;
mod entry;
mod record;

pub use self::category::{CategorizedAssetSet, Category};
pub use self::entry::{Asset, EntryRef, Release, ReleaseEntry};
pub use self::record::{FormatRecord, RecordKind};
