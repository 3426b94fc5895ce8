// src/app/state.rs
//! Application state management.

use std::{
    path::PathBuf,
    sync::mpsc::{Receiver, Sender},
    sync::Arc,
    thread,
};

use anyhow::Result;
use crossterm::event::{KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use image::DynamicImage;
use ratatui::{
    layout::{Position, Rect},
    widgets::ListState,
    Frame,
};
use ratatui_image::{picker::Picker, protocol::Protocol};
use tracing::warn;

use crate::{
    audio::{load_metadata, AudioEngine, AudioSettings, EngineConfig, TrackMetadata},
    config::SettingsStore,
    fs::{load_entries, tail_path, FileCategory},
    player::{is_remote, DefaultFetch, PlayerController},
    ui::{
        keybindings::{
            key_to_action, NavigationAction, Throttle, SEEK_STEP_SECONDS, SEEK_THROTTLE,
            VOLUME_STEP, VOLUME_THROTTLE,
        },
        layout::{compute_layout, SectionVisibility},
        widgets::{render_artwork, render_file_list, render_player_panel},
    },
};

/// Main application state.
pub struct App {
    /// Current directory being browsed
    pub current_dir: PathBuf,
    /// Directory entries (name, is_dir, category, mime)
    pub entries: Vec<(String, bool, FileCategory, String)>,
    /// List widget state
    pub state: ListState,
    /// Currently selected index
    pub selected: usize,

    /// Playback controller bound to the audio engine
    pub controller: PlayerController,
    /// Index of currently playing track in entries (if any)
    pub current_track_index: Option<usize>,

    /// Metadata of the current track, loaded in the background
    pub metadata: Option<TrackMetadata>,
    /// Current artwork image
    pub artwork: Option<DynamicImage>,
    /// Encoded artwork cached per draw area
    artwork_cache: Option<(Rect, Protocol)>,
    /// Image picker for artwork rendering
    picker: Picker,

    /// Metadata channel sender (background loader -> UI)
    meta_tx: Sender<TrackMetadata>,
    /// Metadata channel receiver
    meta_rx: Receiver<TrackMetadata>,

    /// Section visibility state
    pub visibility: SectionVisibility,
    /// Progress bar area from the last draw, for mouse seeking
    progress_area: Option<Rect>,
    seek_throttle: Throttle,
    volume_throttle: Throttle,
}

impl App {
    /// Create a new application instance. `start` optionally names a
    /// path or URL to begin playing right away.
    pub fn new(start: Option<String>) -> Result<Self> {
        let store = SettingsStore::open_default()?;
        let settings = store.load_settings().unwrap_or_else(|e| {
            warn!("could not load settings, using defaults: {}", e);
            AudioSettings::default()
        });

        let cwd = std::env::current_dir()?;
        let entries = load_entries(&cwd);

        // Reselect the last played local track, without starting it.
        let mut selected = 0;
        if start.is_none() {
            if let Ok(Some(last)) = store.load_broadcast() {
                if !is_remote(&last) {
                    let last_path = PathBuf::from(&last);
                    if last_path.parent() == Some(cwd.as_path()) {
                        if let Some(name) = last_path.file_name().and_then(|n| n.to_str()) {
                            if let Some(idx) =
                                entries.iter().position(|e| e.0 == name && !e.1)
                            {
                                selected = idx;
                            }
                        }
                    }
                }
            }
        }

        let engine = Arc::new(AudioEngine::new(EngineConfig {
            settings,
            ..EngineConfig::default()
        })?);
        let controller =
            PlayerController::new(engine, store, settings, Arc::new(DefaultFetch::new()?));

        let mut state = ListState::default();
        state.select(Some(selected));

        // Create picker with fallback if stdio query fails
        let picker =
            Picker::from_query_stdio().unwrap_or_else(|_| Picker::from_fontsize((8, 12)));

        let (meta_tx, meta_rx) = std::sync::mpsc::channel::<TrackMetadata>();

        let mut app = Self {
            current_dir: cwd,
            entries,
            state,
            selected,

            controller,
            current_track_index: None,

            metadata: None,
            artwork: None,
            artwork_cache: None,
            picker,

            meta_tx,
            meta_rx,
            visibility: SectionVisibility::default(),
            progress_area: None,
            seek_throttle: Throttle::new(SEEK_THROTTLE),
            volume_throttle: Throttle::new(VOLUME_THROTTLE),
        };

        if let Some(source) = start {
            app.play_source(&source);
        }

        Ok(app)
    }

    /// Handle a key event and return true if the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        let action = key_to_action(&key);

        match action {
            NavigationAction::ToggleSection(d) => {
                self.visibility.toggle(d);
            }
            NavigationAction::Down => {
                if self.selected + 1 < self.entries.len() {
                    self.selected += 1;
                }
            }
            NavigationAction::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            NavigationAction::Enter => {
                self.open_selected();
            }
            NavigationAction::Back => {
                if self.current_dir.pop() {
                    self.reload_entries();
                }
            }
            NavigationAction::TogglePause => {
                self.controller.toggle_playback();
            }
            NavigationAction::SeekForward => {
                if self.seek_throttle.fire() {
                    self.controller.seek_by(SEEK_STEP_SECONDS);
                }
            }
            NavigationAction::SeekBackward => {
                if self.seek_throttle.fire() {
                    self.controller.seek_by(-SEEK_STEP_SECONDS);
                }
            }
            NavigationAction::VolumeUp => {
                if self.volume_throttle.fire() {
                    self.controller.volume_by(VOLUME_STEP);
                }
            }
            NavigationAction::VolumeDown => {
                if self.volume_throttle.fire() {
                    self.controller.volume_by(-VOLUME_STEP);
                }
            }
            NavigationAction::ToggleMute => {
                self.controller.toggle_mute();
            }
            NavigationAction::ToggleLoop => {
                self.controller.toggle_loop();
            }
            NavigationAction::Quit => {
                return true; // Signal to quit
            }
            NavigationAction::None => {}
        }

        self.state.select(Some(self.selected));
        false
    }

    /// Handle a mouse event: dragging or clicking the progress bar
    /// seeks. The slider follows the pointer during the drag and the
    /// seek is committed on release.
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        let Some(area) = self.progress_area else {
            return;
        };
        let slider = self.controller.slider();

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if area.contains(Position::new(mouse.column, mouse.row)) {
                    slider.begin_drag();
                    slider.drag_to(self.pointer_to_seconds(area, mouse.column));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if slider.snapshot().dragging {
                    slider.drag_to(self.pointer_to_seconds(area, mouse.column));
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if slider.snapshot().dragging {
                    let target = slider.end_drag();
                    self.controller.change_progress(target);
                }
            }
            _ => {}
        }
    }

    /// Process any pending metadata from background loader.
    pub fn process_metadata(&mut self) {
        if let Ok(meta) = self.meta_rx.try_recv() {
            self.artwork = meta
                .artwork
                .as_ref()
                .and_then(|bytes| image::load_from_memory(bytes).ok());
            self.artwork_cache = None;
            self.metadata = Some(meta);
        }
    }

    /// Draw the application UI.
    pub fn draw(&mut self, f: &mut Frame<'_>) {
        let area = f.area();
        let layout = compute_layout(area, &self.visibility);
        self.progress_area = None;

        // Render visible columns in order
        let mut col_index = 0usize;

        for section in layout.section_order.iter() {
            match *section {
                "files" => {
                    if col_index < layout.columns.len() {
                        let title = format!("1:  {}", tail_path(&self.current_dir, 3));
                        render_file_list(
                            f,
                            layout.columns[col_index],
                            &title,
                            &self.entries,
                            &mut self.state,
                            self.current_track_index,
                        );
                    }
                    col_index += 1;
                }
                "player" => {
                    if col_index < layout.columns.len() {
                        let states = self.controller.states();
                        let settings = self.controller.settings();
                        let slider = self.controller.slider().snapshot();
                        let source = self.controller.current_source();
                        let error = self.controller.last_error();
                        self.progress_area = render_player_panel(
                            f,
                            layout.columns[col_index],
                            self.metadata.as_ref(),
                            source.as_deref(),
                            slider,
                            &states,
                            &settings,
                            error.as_deref(),
                        );
                    }
                    col_index += 1;
                }
                "artwork" => {
                    if col_index < layout.columns.len() {
                        render_artwork(
                            f,
                            layout.columns[col_index],
                            &mut self.picker,
                            self.artwork.as_ref(),
                            &mut self.artwork_cache,
                        );
                    }
                    col_index += 1;
                }
                _ => {}
            }
        }
    }

    /// Tear down playback before the terminal is restored.
    pub fn shutdown(&mut self) {
        self.controller.close();
    }

    /// Open the selected entry: descend into directories, play audio.
    fn open_selected(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        let (name, is_dir, category, _) = self.entries[self.selected].clone();
        let path = self.current_dir.join(&name);

        if is_dir {
            self.current_dir.push(&name);
            self.reload_entries();
        } else if category == FileCategory::Audio {
            self.current_track_index = Some(self.selected);
            self.play_source(&path.to_string_lossy());
        }
    }

    /// Hand a source to the controller and kick off the background
    /// metadata loader for local files.
    fn play_source(&mut self, source: &str) {
        self.controller.play(source);
        self.metadata = None;
        self.artwork = None;
        self.artwork_cache = None;

        if !is_remote(source) {
            let tx = self.meta_tx.clone();
            let path = PathBuf::from(source);
            thread::spawn(move || {
                if let Ok(meta) = load_metadata(path) {
                    let _ = tx.send(meta);
                }
            });
        }
    }

    fn reload_entries(&mut self) {
        self.entries = load_entries(&self.current_dir);
        self.selected = 0;
        self.state.select(Some(0));
        self.current_track_index = None;
    }

    fn pointer_to_seconds(&self, area: Rect, column: u16) -> f64 {
        let duration = self.controller.slider().snapshot().duration;
        let width = area.width.max(1) as f64;
        let offset = column.saturating_sub(area.x) as f64;
        (offset / width).clamp(0.0, 1.0) * duration
    }
}
