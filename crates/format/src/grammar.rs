//! Release asset naming grammars.
//!
//! Structured release assets follow `<project>_<resource>_v<version>_<info>.<ext>`,
//! e.g. `en_ulb_v12.1_mat.pdf`. Per-chapter media and zipped media bundles carry
//! a second grammar inside `info`: `<chapter|media-ext>_<quality>`, e.g.
//! `en_ulb_v12.1_01_hi.mp3` or `en_ulb_v12.1_mp3_hi.zip`.

use crate::consts;

/// Parts of a file name matching the main release asset grammar.
///
/// All parts are lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileParts {
    pub project: String,
    pub resource: String,
    /// Digits, dots and hyphens only.
    pub version: String,
    /// Free-form text between the version and the extension, may be empty.
    pub info: String,
    pub extension: String,
}
impl FileParts {
    /// Identity prefix shared by every version of the same logical asset.
    pub fn grouping_key(&self) -> String {
        format!("{}_{}", self.project, self.resource)
    }
}

/// Parses a file name with the main release asset grammar.
///
/// ```
/// use dcs_format::parse_file_name;
/// let parts = parse_file_name("EN_ULB_v12.1_MAT.pdf").unwrap();
/// assert_eq!(parts.grouping_key(), "en_ulb");
/// assert_eq!(parts.version, "12.1");
/// assert_eq!(parts.info, "mat");
/// assert_eq!(parts.extension, "pdf");
/// assert!(parse_file_name("README.md").is_none());
/// ```
pub fn parse_file_name(name: &str) -> Option<FileParts> {
    let name = name.to_lowercase();
    let captures = consts::FILE_PARTS_REGEX.captures(&name)?;
    let part = |i: usize| captures.get(i).map(|m| m.as_str().to_string()).unwrap_or_default();
    Some(FileParts {
        project: part(1),
        resource: part(2),
        version: part(3),
        info: part(4),
        extension: part(5),
    })
}

/// Parts of the `info` section of a chaptered media file or media bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaParts {
    /// Either a chapter number (`01`) or a media extension (`mp3`, `mp4`, `3gpp`).
    pub token: String,
    pub quality: String,
}
impl MediaParts {
    /// Whether the token names a video container.
    pub fn is_video_token(&self) -> bool {
        matches!(self.token.as_str(), "mp4" | "3gpp")
    }
}

/// Parses the `info` part of [`FileParts`] with the media suffix grammar.
///
/// ```
/// use dcs_format::parse_media_suffix;
/// let media = parse_media_suffix("01_hi").unwrap();
/// assert_eq!(media.token, "01");
/// assert_eq!(media.quality, "hi");
/// assert!(parse_media_suffix("mat").is_none());
/// ```
pub fn parse_media_suffix(info: &str) -> Option<MediaParts> {
    let captures = consts::MEDIA_PARTS_REGEX.captures(info)?;
    Some(MediaParts {
        token: captures.get(1)?.as_str().to_string(),
        quality: captures.get(2)?.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("proj_res_v2_full.pdf", "proj_res", "2", "full", "pdf")]
    #[case("proj_res_v1_01_high.mp3", "proj_res", "1", "01_high", "mp3")]
    #[case("en_obs_v9-1.2_mp4_720p.zip", "en_obs", "9-1.2", "mp4_720p", "zip")]
    #[case("en_ult_v40.docx", "en_ult", "40", "", "docx")]
    #[case("en_ult_v40__mat.pdf", "en_ult", "40", "mat", "pdf")]
    #[case("En_ULT_V40_Mat.PDF", "en_ult", "40", "mat", "pdf")]
    fn test_parse_file_name(
        #[case] name: &str,
        #[case] key: &str,
        #[case] version: &str,
        #[case] info: &str,
        #[case] ext: &str,
    ) {
        let parts = parse_file_name(name).unwrap();
        assert_eq!(parts.grouping_key(), key);
        assert_eq!(parts.version, version);
        assert_eq!(parts.info, info);
        assert_eq!(parts.extension, ext);
    }

    #[rstest]
    #[case("README.md")]
    #[case("proj_res_full.pdf")]
    #[case("proj_res_vX_full.pdf")]
    #[case("proj_res_v1_full")]
    #[case("https://door43.org/u/owner/repo")]
    #[case("")]
    fn test_parse_file_name_rejects(#[case] name: &str) {
        assert!(parse_file_name(name).is_none());
    }

    #[rstest]
    #[case("01_high", "01", "high", false)]
    #[case("150_64kbps", "150", "64kbps", false)]
    #[case("mp3_hi", "mp3", "hi", false)]
    #[case("mp4_720p", "mp4", "720p", true)]
    #[case("3gpp_240p", "3gpp", "240p", true)]
    fn test_parse_media_suffix(#[case] info: &str, #[case] token: &str, #[case] quality: &str, #[case] video: bool) {
        let media = parse_media_suffix(info).unwrap();
        assert_eq!(media.token, token);
        assert_eq!(media.quality, quality);
        assert_eq!(media.is_video_token(), video);
    }

    #[rstest]
    #[case("full")]
    #[case("01")]
    #[case("01_high_extra")]
    #[case("intro_high")]
    #[case("")]
    fn test_parse_media_suffix_rejects(#[case] info: &str) {
        assert!(parse_media_suffix(info).is_none());
    }
}
