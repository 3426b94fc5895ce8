// src/audio/metadata.rs
//! Track metadata extraction using Lofty.

use std::path::{Path, PathBuf};

use anyhow::Result;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::Accessor;

/// One metadata entry: raw tag key & value.
pub type TagEntry = (String, String);

/// Collected metadata for a track: the headline fields the player panel
/// shows, the raw tag/property dumps below them, and embedded artwork.
#[derive(Debug, Clone, Default)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// All tag-frame key/value pairs from the primary tag.
    pub tags: Vec<TagEntry>,
    /// Audio properties (bitrate, sample rate, channels).
    pub properties: Vec<(String, String)>,
    /// Total track length in seconds.
    pub duration_secs: u64,
    /// Raw image bytes (PNG/JPEG) for artwork, if available.
    pub artwork: Option<Vec<u8>>,
}

impl TrackMetadata {
    /// Title to display: the tag title, else the file stem, else the
    /// whole source string.
    pub fn display_title(&self, source: &str) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        Path::new(source)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| source.to_string())
    }
}

/// Load metadata for a file path without touching player state.
/// Safe to call from a background thread.
pub fn load_metadata(path: PathBuf) -> Result<TrackMetadata> {
    let tagged_file = Probe::open(&path)?.read()?;

    let primary = tagged_file.primary_tag();

    let title = primary.and_then(|t| t.title().map(|s| s.into_owned()));
    let artist = primary.and_then(|t| t.artist().map(|s| s.into_owned()));
    let album = primary.and_then(|t| t.album().map(|s| s.into_owned()));

    let artwork = primary.and_then(|tag| tag.pictures().first().map(|pic| pic.data().to_vec()));

    let mut tags = Vec::new();
    if let Some(tag) = primary {
        for item in tag.items() {
            tags.push((format!("{:?}", item.key()), format!("{:?}", item.value())));
        }
    }

    let props = tagged_file.properties();
    let mut properties = Vec::new();
    if let Some(b) = props.audio_bitrate() {
        properties.push(("Bitrate (kbps)".into(), b.to_string()));
    }
    if let Some(sr) = props.sample_rate() {
        properties.push(("Sample Rate (Hz)".into(), sr.to_string()));
    }
    if let Some(ch) = props.channels() {
        properties.push(("Channels".into(), ch.to_string()));
    }
    let duration_secs = props.duration().as_secs();

    Ok(TrackMetadata {
        title,
        artist,
        album,
        tags,
        properties,
        duration_secs,
        artwork,
    })
}
