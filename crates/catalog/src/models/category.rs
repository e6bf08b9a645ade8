use super::FormatRecord;
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// The four fixed display categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Text,
    Audio,
    Video,
    Other,
}
impl Category {
    pub const ALL: [Category; 4] = [Category::Text, Category::Audio, Category::Video, Category::Other];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Text => "text",
            Category::Audio => "audio",
            Category::Video => "video",
            Category::Other => "other",
        }
    }

    /// Category of a plain typed asset, chosen by substring match on its
    /// format tag.
    ///
    /// ```
    /// use dcs_catalog::models::Category;
    /// assert_eq!(Category::for_format("audio/mp3"), Category::Audio);
    /// assert_eq!(Category::for_format("application/zip; content=video/mp4"), Category::Video);
    /// assert_eq!(Category::for_format("application/pdf"), Category::Text);
    /// assert_eq!(Category::for_format("application/zip"), Category::Other);
    /// ```
    pub fn for_format(format: &str) -> Self {
        const TEXT_MARKERS: [&str; 6] = ["markdown", "pdf", "docx", "odt", "epub", "door43"];
        if format.contains("audio") {
            Category::Audio
        } else if format.contains("video") {
            Category::Video
        } else if TEXT_MARKERS.iter().any(|marker| format.contains(marker)) {
            Category::Text
        } else {
            Category::Other
        }
    }
}
impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Grouped records keyed by the four fixed categories, each in discovery
/// order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategorizedAssetSet {
    pub text: Vec<FormatRecord>,
    pub audio: Vec<FormatRecord>,
    pub video: Vec<FormatRecord>,
    pub other: Vec<FormatRecord>,
}
impl CategorizedAssetSet {
    pub fn get(&self, category: Category) -> &[FormatRecord] {
        match category {
            Category::Text => &self.text,
            Category::Audio => &self.audio,
            Category::Video => &self.video,
            Category::Other => &self.other,
        }
    }

    pub(crate) fn get_mut(&mut self, category: Category) -> &mut Vec<FormatRecord> {
        match category {
            Category::Text => &mut self.text,
            Category::Audio => &mut self.audio,
            Category::Video => &mut self.video,
            Category::Other => &mut self.other,
        }
    }

    /// Non-empty categories with their records, in fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[FormatRecord])> {
        Category::ALL.into_iter().map(|category| (category, self.get(category))).filter(|(_, r)| !r.is_empty())
    }

    /// Number of top-level records across all categories.
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|category| self.get(*category).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
