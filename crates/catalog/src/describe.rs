//! Display labels for grouped records.

use crate::models::FormatRecord;
use dcs_format::{ZIP_FORMAT, human_size};
use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use url::Url;

/// Icon shown next to a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Icon {
    Article,
    PictureAsPdf,
    Language,
    AudioFile,
    VideoFile,
    FolderZip,
    YouTube,
    Book,
    AutoStories,
    Code,
    Source,
}
impl Icon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Icon::Article => "article",
            Icon::PictureAsPdf => "picture_as_pdf",
            Icon::Language => "language",
            Icon::AudioFile => "audio_file",
            Icon::VideoFile => "video_file",
            Icon::FolderZip => "folder_zip",
            Icon::YouTube => "youtube",
            Icon::Book => "book",
            Icon::AutoStories => "auto_stories",
            Icon::Code => "code",
            Icon::Source => "source",
        }
    }
}
impl Display for Icon {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

/// Rendered label of a record: `title (detail)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Description {
    pub icon: Icon,
    pub title: String,
    pub detail: String,
}
impl Display for Description {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({})", self.title, self.detail)
    }
}

/// `mime_tag` split into its MIME type and optional `content=` parameter.
struct FormatParts<'a> {
    mime: &'a str,
    content: Option<&'a str>,
}
impl<'a> FormatParts<'a> {
    fn parse(format: &'a str) -> Self {
        let mut parts = format.split(';').map(str::trim).filter(|part| !part.is_empty());
        let mime = parts.next().unwrap_or_default();
        let content = parts.find_map(|part| match part.split_once('=') {
            Some(("content", value)) => Some(value.trim()),
            _ => None,
        });
        Self { mime, content }
    }

    fn is_zipped(&self) -> bool {
        self.mime == ZIP_FORMAT
    }

    /// The type the record should be described as: the zipped content when
    /// there is one.
    fn resolved(&self) -> &'a str {
        match self.content {
            Some(content) if self.is_zipped() => content,
            _ => self.mime,
        }
    }
}

/// Whether `url` points at a source archive on the catalog itself
/// (`<origin>/<owner>/<repo>/archive/...`).
fn is_source_archive(url: &str, origin_host: Option<&str>) -> bool {
    let Ok(url) = Url::parse(url) else {
        return false;
    };
    if origin_host.is_none() || url.host_str() != origin_host {
        return false;
    }
    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    segments.len() > 3 && segments[2] == "archive"
}

/// `Chapter N: ` from a chapter identifier; the number is the identifier's
/// leading digits, the raw identifier when there are none.
fn chapter_prefix(identifier: &str) -> String {
    let digits_end = identifier.find(|c: char| !c.is_ascii_digit()).unwrap_or(identifier.len());
    match identifier[..digits_end].parse::<u64>() {
        Ok(number) => format!("Chapter {number}: "),
        Err(_) => format!("Chapter {identifier}: "),
    }
}

/// Builds the display label of a grouped record.
///
/// `catalog_origin` is the catalog's base URL; links to its own host are
/// labelled as source files.
///
/// ```
/// use dcs_catalog::{Icon, describe, fold};
/// use dcs_catalog::models::{Asset, ReleaseEntry};
///
/// let entry = ReleaseEntry::new("o", "r", "v1");
/// let url = "https://git.door43.org/o/r/releases/download/v1/en_ult_v1_mat.pdf";
/// let asset = Asset::new("en_ult_v1_mat.pdf", url, 1536);
/// let grouped = fold([(&asset, &entry)]);
/// let label = describe(&grouped.set().text[0], "https://git.door43.org");
/// assert_eq!(label.icon, Icon::PictureAsPdf);
/// assert_eq!(label.to_string(), "en_ult_v1_mat.pdf (PDF; 1.5 KB)");
/// ```
pub fn describe(record: &FormatRecord, catalog_origin: &str) -> Description {
    let origin = Url::parse(catalog_origin).ok();
    let origin_host = origin.as_ref().and_then(Url::host_str);
    let format = FormatParts::parse(&record.mime_tag);
    let resolved = format.resolved();
    let kind = resolved.rsplit('/').next().unwrap_or_default();

    let mut icon = Icon::Article;
    let mut show_size = true;
    let mut detail = match kind {
        "pdf" => {
            icon = Icon::PictureAsPdf;
            "PDF".to_string()
        },
        "youtube" | "youtube.com" => {
            icon = Icon::YouTube;
            show_size = false;
            "Website".to_string()
        },
        "bloom" | "bloomlibrary.org" => {
            icon = Icon::Book;
            show_size = false;
            "Website".to_string()
        },
        "door43.org" => {
            icon = Icon::Language;
            show_size = false;
            "Website".to_string()
        },
        host if origin_host == Some(host) => {
            icon = Icon::FolderZip;
            show_size = false;
            "Source Files".to_string()
        },
        "docx" => "Word Document".to_string(),
        "odt" => "OpenDocument Text".to_string(),
        "epub" => {
            icon = Icon::AutoStories;
            "ePub Book".to_string()
        },
        "markdown" | "md" => {
            icon = Icon::Source;
            "Markdown".to_string()
        },
        "html" => {
            icon = Icon::Code;
            "HTML".to_string()
        },
        "usfm" => {
            icon = Icon::Source;
            "USFM".to_string()
        },
        "mp3" => {
            icon = Icon::AudioFile;
            "MP3".to_string()
        },
        "mp4" => {
            icon = Icon::VideoFile;
            "MP4".to_string()
        },
        "3gp" | "3gpp" => {
            icon = Icon::VideoFile;
            "3GP".to_string()
        },
        "zip" => {
            icon = Icon::FolderZip;
            match record.download_url() {
                Some(url) if is_source_archive(url, origin_host) => "Zipped, Source Files".to_string(),
                _ => "Zipped".to_string(),
            }
        },
        _ => record.mime_tag.clone(),
    };

    if !record.quality_tier.is_empty() && !detail.to_lowercase().contains(&record.quality_tier.to_lowercase()) {
        detail.push_str("; ");
        detail.push_str(&record.quality_tier);
    }
    let size = record.size();
    if show_size && size > 0 {
        detail.push_str("; ");
        detail.push_str(&human_size(size));
        if format.is_zipped() {
            detail.push_str(" zipped");
        }
    }

    let name = record.asset.as_ref().map_or(record.display_name.as_str(), |asset| asset.name.as_str());
    let title = match record.identifier() {
        Some(identifier) => format!("{}{name}", chapter_prefix(identifier)),
        None => name.to_string(),
    };
    Description { icon, title, detail }
}
