//! Extension-based content classification
//!
//! Classification looks only at the file name, never at file contents.
//! Each category has a static extension set and a plain predicate over the
//! lowercased extension; [`predicate_for`] is the dispatch table used by
//! the catalog to pick the filter for a selected category.

use std::path::Path;

use crate::models::Category;

/// Predicate over a lowercased file extension
pub type Classifier = fn(&str) -> bool;

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "ogg", "flac", "aac", "wma", "m4a", "ape", "amr", "mid", "midi", "ra", "aiff",
    "opus",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "wmv", "flv", "mov", "webm", "m4v", "ts", "rmvb", "rm", "3gp", "mpg",
    "mpeg", "vob", "asf", "divx",
];

const EBOOK_EXTENSIONS: &[&str] = &["txt", "epub", "pdf", "mobi", "fb2", "chm", "umd", "pdb"];

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif"];

const PACKAGE_EXTENSIONS: &[&str] = &["apk"];

/// Extract the lowercased extension of a file name.
///
/// Everything after the last `.` counts, so `.mp3` yields `"mp3"`.
/// Names without a dot, or ending in one, yield `""`.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Extract the lowercased extension from the final component of `path`
pub fn path_extension(path: &Path) -> String {
    path.file_name()
        .map(|name| extension_of(&name.to_string_lossy()))
        .unwrap_or_default()
}

pub fn is_audio(ext: &str) -> bool {
    AUDIO_EXTENSIONS.contains(&ext)
}

pub fn is_video(ext: &str) -> bool {
    VIDEO_EXTENSIONS.contains(&ext)
}

pub fn is_ebook(ext: &str) -> bool {
    EBOOK_EXTENSIONS.contains(&ext)
}

pub fn is_image(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// Installable application packages
pub fn is_package(ext: &str) -> bool {
    PACKAGE_EXTENSIONS.contains(&ext)
}

/// Look up the predicate for a category. `Unknown` has none.
pub fn predicate_for(category: Category) -> Option<Classifier> {
    match category {
        Category::Audio => Some(is_audio),
        Category::Video => Some(is_video),
        Category::Ebook => Some(is_ebook),
        Category::Image => Some(is_image),
        Category::Package => Some(is_package),
        Category::Unknown => None,
    }
}
