//! Pure helpers describing release assets by name alone: the format
//! classifier, the structured naming grammars and the size formatter.

mod classify;
mod consts;
mod grammar;
mod size;

pub use crate::classify::{UNKNOWN_FORMAT, ZIP_FORMAT, classify, file_extension};
pub use crate::grammar::{FileParts, MediaParts, parse_file_name, parse_media_suffix};
pub use crate::size::human_size;
