// src/fs/detection.rs
//! File type detection using magic numbers and extension-based fallback.

use std::{fmt, path::Path};

use anyhow::Result;
use infer::{Infer, MatcherType};
use mime_guess::MimeGuess;

/// Broad categories the browser distinguishes.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileCategory {
    Audio,
    Image,
    Video,
    Document,
    Binary,
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileCategory::Audio => "Audio",
            FileCategory::Image => "Image",
            FileCategory::Video => "Video",
            FileCategory::Document => "Document",
            FileCategory::Binary => "Binary",
        };
        write!(f, "{}", s)
    }
}

/// Holds a detected MIME type + category.
#[derive(Debug, Clone)]
pub struct FileType {
    pub mime: String,
    pub category: FileCategory,
}

/// Detect MIME type & category for a given file path.
///
/// Magic-number sniffing first; extension lookup when the content is
/// not recognized.
pub fn detect_file_type(path: &Path) -> Result<FileType> {
    if let Some(kind) = Infer::new().get_from_path(path)? {
        let mime = kind.mime_type().to_string();
        let category = match kind.matcher_type() {
            MatcherType::Audio => FileCategory::Audio,
            MatcherType::Image => FileCategory::Image,
            MatcherType::Video => FileCategory::Video,
            _ => FileCategory::Binary,
        };
        return Ok(FileType { mime, category });
    }

    let mime = MimeGuess::from_path(path)
        .first_or_octet_stream()
        .to_string();
    let category = match mime.split('/').next().unwrap_or("application") {
        "audio" => FileCategory::Audio,
        "image" => FileCategory::Image,
        "video" => FileCategory::Video,
        "text" => FileCategory::Document,
        "application" => FileCategory::Document,
        _ => FileCategory::Binary,
    };

    Ok(FileType { mime, category })
}

/// True when the path detects as playable audio.
pub fn is_audio(path: &Path) -> bool {
    detect_file_type(path)
        .map(|t| t.category == FileCategory::Audio)
        .unwrap_or(false)
}
