// src/logging.rs
//! Tracing setup.
//!
//! The TUI owns stdout, so log lines go to a file under the config
//! directory instead. `RUST_LOG` overrides the default filter.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber, appending to `tremolo.log`
/// inside `dir`. Returns an error if the log file cannot be opened.
pub fn init(dir: &Path) -> crate::error::Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("tremolo.log"))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tremolo=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}
