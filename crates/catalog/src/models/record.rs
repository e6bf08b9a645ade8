use super::{Asset, EntryRef};
use serde::Serialize;

/// Shape of a grouped record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordKind {
    /// A single typed file or link.
    Plain,
    /// A zipped media bundle, with the per-chapter files belonging to it.
    /// Chapters are kept sorted by identifier.
    Archive { chapters: Vec<FormatRecord> },
    /// One chapter of an [`Archive`](Self::Archive).
    Chapter { identifier: String },
}

/// A classified release asset, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatRecord {
    pub source_entry: EntryRef,
    /// Shown to the user; the asset's file name unless synthesized.
    pub display_name: String,
    /// Lowercase file extension, or empty.
    pub extension: String,
    /// Format tag from [`dcs_format::classify`].
    pub mime_tag: String,
    /// Identity prefix shared by every version of the same logical asset
    /// (`project_resource`, or the link's host name).
    pub grouping_key: String,
    /// Media quality label (`64kbps`, `720p`, ...), empty when not applicable.
    pub quality_tier: String,
    /// Compared as a plain string, not semantically.
    pub version_tag: String,
    /// `None` for an archive only known through its chapters so far.
    pub asset: Option<Asset>,
    #[serde(flatten)]
    pub kind: RecordKind,
}
impl FormatRecord {
    pub fn chapters(&self) -> &[FormatRecord] {
        match &self.kind {
            RecordKind::Archive { chapters } => chapters,
            _ => &[],
        }
    }

    /// Mutable chapter list, turning a plain record into an archive first.
    pub(crate) fn chapters_mut(&mut self) -> &mut Vec<FormatRecord> {
        if !matches!(self.kind, RecordKind::Archive { .. }) {
            self.kind = RecordKind::Archive { chapters: Vec::new() };
        }
        match &mut self.kind {
            RecordKind::Archive { chapters } => chapters,
            _ => unreachable!("record kind was just set to archive"),
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            RecordKind::Chapter { identifier } => Some(identifier),
            _ => None,
        }
    }

    pub fn download_url(&self) -> Option<&str> {
        self.asset.as_ref().map(|asset| asset.download_url.as_str())
    }

    /// Size of the attached asset in bytes, zero without one.
    pub fn size(&self) -> u64 {
        self.asset.as_ref().map(|asset| asset.size).unwrap_or_default()
    }

    /// Whether `other` is the same logical asset as `self` (ignoring version).
    pub(crate) fn same_identity(&self, other: &FormatRecord) -> bool {
        self.grouping_key == other.grouping_key
            && self.quality_tier == other.quality_tier
            && self.extension == other.extension
            && self.mime_tag == other.mime_tag
    }
}
