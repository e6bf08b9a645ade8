use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// `<project>_<resource>_v<version>_<info>.<ext>`, matched against the lowercased file name.
regex!(FILE_PARTS_REGEX, r"^([^_]+)_([^_]+)_v([\d.-]+)_*(.*)\.([^._]+)$");
// `<chapter|mpN|3gpp>_<quality>`, matched against the `info` part of the above.
regex!(MEDIA_PARTS_REGEX, r"^(\d+|mp\d|3gpp)_([^_]+)$");
// Media marker embedded in the name of a zipped media bundle.
regex!(ZIP_CONTENT_REGEX, r"_(mp3|3gp|mp4)_");
