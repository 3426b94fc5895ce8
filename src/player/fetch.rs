// src/player/fetch.rs
//! Resolving a track source string to raw bytes.
//!
//! The controller only sees the `TrackFetch` trait; local files and HTTP
//! downloads are interchangeable, and tests substitute stub fetchers.

use std::fs;
use std::time::Duration;

use crate::error::{PlayerError, Result};

const USER_AGENT: &str = concat!("tremolo/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Resolves a source string (path or URL) to the track's raw bytes.
pub trait TrackFetch: Send + Sync {
    fn fetch(&self, source: &str) -> Result<Vec<u8>>;
}

/// Reads local files.
pub struct FileFetch;

impl TrackFetch for FileFetch {
    fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        fs::read(source).map_err(|e| PlayerError::Fetch(format!("{}: {}", source, e)))
    }
}

/// Downloads over HTTP with standard client configuration.
pub struct HttpFetch {
    client: reqwest::blocking::Client,
}

impl HttpFetch {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlayerError::Fetch(e.to_string()))?;
        Ok(Self { client })
    }
}

impl TrackFetch for HttpFetch {
    fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(source)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PlayerError::Fetch(e.to_string()))?;
        let bytes = resp
            .bytes()
            .map_err(|e| PlayerError::Fetch(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// True when the source names a network URL rather than a local path.
pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Scheme dispatch: `http(s)://` goes over the network, everything else
/// is treated as a filesystem path.
pub struct DefaultFetch {
    http: HttpFetch,
    file: FileFetch,
}

impl DefaultFetch {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: HttpFetch::new()?,
            file: FileFetch,
        })
    }
}

impl TrackFetch for DefaultFetch {
    fn fetch(&self, source: &str) -> Result<Vec<u8>> {
        if is_remote(source) {
            self.http.fetch(source)
        } else {
            self.file.fetch(source)
        }
    }
}
