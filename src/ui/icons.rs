// src/ui/icons.rs
//! Nerd-font glyphs for browser entries.

use crate::fs::FileCategory;

/// Glyph shown before an entry name in the file list.
pub fn entry_icon(is_dir: bool, category: FileCategory) -> &'static str {
    match (is_dir, category) {
        (true, _) => "\u{f07b}",
        (false, FileCategory::Audio) => "\u{f1c7}",
        (false, FileCategory::Image) => "\u{f1c5}",
        (false, FileCategory::Video) => "\u{f1c8}",
        (false, FileCategory::Document) => "\u{f15c}",
        (false, FileCategory::Binary) => "\u{f1c6}",
    }
}
