// src/main.rs

use anyhow::Result;

use tremolo::config::SettingsStore;
use tremolo::{logging, ui};

fn main() -> Result<()> {
    // Logging goes to a file in the config directory; the terminal
    // itself belongs to the UI.
    let store = SettingsStore::open_default()?;
    if let Err(e) = logging::init(store.dir()) {
        eprintln!("logging disabled: {}", e);
    }

    let start = std::env::args().nth(1);
    ui::run(start)
}
