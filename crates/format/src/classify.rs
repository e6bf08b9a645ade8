//! File name to format tag classification.
//!
//! A format tag is either a MIME-like `kind/subtype` string (optionally with a
//! `; content=kind/subtype` parameter for zipped media), a bare host-name token
//! for links to known websites, or the raw file extension when nothing better
//! is known.

use crate::consts;

/// Tag returned when a name has neither a usable extension nor a known host.
pub const UNKNOWN_FORMAT: &str = "unknown";
/// Tag of a zip archive with no recognised media marker.
pub const ZIP_FORMAT: &str = "application/zip";

/// Host names sniffed from the file name when the extension says nothing.
const KNOWN_HOSTS: [&str; 3] = ["door43.org", "youtube.com", "bloomlibrary.org"];

/// Returns the non-empty text after the last `.` of `name`, if there is any.
///
/// ```
/// use dcs_format::file_extension;
/// assert_eq!(file_extension("en_ulb.PDF"), Some("PDF"));
/// assert_eq!(file_extension("README"), None);
/// assert_eq!(file_extension("More at example.org/page"), Some("org/page"));
/// ```
pub fn file_extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext).filter(|ext| !ext.is_empty())
}

fn extension_format(ext: &str) -> Option<&'static str> {
    Some(match ext {
        "3gp" => "video/3gp",
        "html" => "text/html",
        "md" => "text/markdown",
        "mp3" => "audio/mp3",
        "mp4" => "video/mp4",
        "pdf" => "application/pdf",
        "txt" => "text/txt",
        "usfm" => "text/usfm",
        "doc" => "application/doc",
        "docx" => "application/docx",
        "epub" => "application/epub",
        "odt" => "application/odt",
        _ => return None,
    })
}

fn zip_format(lowercase_name: &str) -> String {
    let content = consts::ZIP_CONTENT_REGEX.captures(lowercase_name).and_then(|captures| {
        Some(match captures.get(1)?.as_str() {
            "3gp" => "video/3gp",
            "mp4" => "video/mp4",
            "mp3" => "audio/mp3",
            _ => return None,
        })
    });
    match content {
        Some(content) => format!("{ZIP_FORMAT}; content={content}"),
        None => ZIP_FORMAT.to_string(),
    }
}

/// Classifies a file name into a format tag.
///
/// Matching is case-insensitive. Never fails: a name that yields nothing
/// derivable is tagged [`UNKNOWN_FORMAT`].
///
/// ```
/// use dcs_format::classify;
/// assert_eq!(classify("a.mp4"), "video/mp4");
/// assert_eq!(classify("a_mp3_b.zip"), "application/zip; content=audio/mp3");
/// assert_eq!(classify("View on door43.org"), "door43.org");
/// assert_eq!(classify("notes.xyz"), "xyz");
/// assert_eq!(classify("LICENSE"), "unknown");
/// ```
pub fn classify(name: &str) -> String {
    let name = name.to_lowercase();
    let ext = file_extension(&name);
    match ext {
        Some("zip") => return zip_format(&name),
        Some(ext) => {
            if let Some(format) = extension_format(ext) {
                return format.to_string();
            }
        },
        None => {},
    }
    if let Some(host) = KNOWN_HOSTS.iter().find(|host| name.contains(*host)) {
        return host.to_string();
    }
    ext.unwrap_or(UNKNOWN_FORMAT).to_string()
}
