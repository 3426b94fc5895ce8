// src/fs/browser.rs
//! Directory listing for the browser pane.

use std::path::{Component, Path};

use tracing::warn;

use super::detection::{detect_file_type, FileCategory};

/// List `dir` as (name, is_dir, category, mime) rows: directories
/// first, then files, each group sorted case-insensitively. Hidden
/// entries are skipped; an unreadable directory yields an empty list.
pub fn load_entries(dir: &Path) -> Vec<(String, bool, FileCategory, String)> {
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) => {
            warn!("could not read {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut entries: Vec<(String, bool, FileCategory, String)> = Vec::new();
    for entry in read.flatten() {
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if name.starts_with('.') {
            continue;
        }
        if path.is_dir() {
            entries.push((name, true, FileCategory::Binary, String::new()));
        } else {
            let (category, mime) = match detect_file_type(&path) {
                Ok(t) => (t.category, t.mime),
                Err(_) => (FileCategory::Binary, "application/octet-stream".into()),
            };
            entries.push((name, false, category, mime));
        }
    }

    entries.sort_by(|a, b| (!a.1, a.0.to_lowercase()).cmp(&(!b.1, b.0.to_lowercase())));
    entries
}

/// Last `n` components of `path` joined with '/', for compact titles.
pub fn tail_path(path: &Path, n: usize) -> String {
    let parts: Vec<&str> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(os) => os.to_str(),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        return "/".to_string();
    }
    let start = parts.len().saturating_sub(n);
    parts[start..].join("/")
}
