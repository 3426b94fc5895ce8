// src/ui/keybindings.rs
//! Keyboard input handling and key mappings.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Seconds moved per seek keypress.
pub const SEEK_STEP_SECONDS: f64 = 5.0;
/// Volume moved per volume keypress.
pub const VOLUME_STEP: f32 = 0.1;
/// Minimum gap between accepted seek keypresses.
pub const SEEK_THROTTLE: Duration = Duration::from_millis(250);
/// Minimum gap between accepted volume keypresses.
pub const VOLUME_THROTTLE: Duration = Duration::from_millis(50);

/// Map digit/shifted-digit keys to section number (1..3).
pub fn map_key_to_digit(k: &KeyEvent) -> Option<usize> {
    if let KeyCode::Char(c) = k.code {
        match c {
            '1' | '!' => Some(1),
            '2' | '@' => Some(2),
            '3' | '#' => Some(3),
            _ => None,
        }
    } else {
        None
    }
}

/// Check if the key event is a shifted symbol (!, @, #).
pub fn is_shifted_symbol(key: &KeyEvent) -> bool {
    matches!(
        key.code,
        KeyCode::Char('!') | KeyCode::Char('@') | KeyCode::Char('#')
    )
}

/// Check if this is a section toggle key press (Shift+number).
pub fn is_section_toggle(key: &KeyEvent) -> bool {
    if map_key_to_digit(key).is_some() {
        key.modifiers.contains(KeyModifiers::SHIFT) || is_shifted_symbol(key)
    } else {
        false
    }
}

/// Navigation and transport actions derived from key events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigationAction {
    Up,
    Down,
    Enter,
    Back,
    TogglePause,
    SeekForward,
    SeekBackward,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    ToggleLoop,
    Quit,
    ToggleSection(usize),
    None,
}

/// Convert a key event to a navigation action.
pub fn key_to_action(key: &KeyEvent) -> NavigationAction {
    // Check for section toggle first
    if let Some(d) = map_key_to_digit(key) {
        if key.modifiers.contains(KeyModifiers::SHIFT) || is_shifted_symbol(key) {
            return NavigationAction::ToggleSection(d);
        }
    }

    match key.code {
        KeyCode::Down => NavigationAction::Down,
        KeyCode::Up => NavigationAction::Up,
        KeyCode::Enter | KeyCode::Right => NavigationAction::Enter,
        KeyCode::Left => NavigationAction::Back,
        KeyCode::Char(' ') => NavigationAction::TogglePause,
        KeyCode::Char(',') => NavigationAction::SeekBackward,
        KeyCode::Char('.') => NavigationAction::SeekForward,
        KeyCode::Char('-') => NavigationAction::VolumeDown,
        KeyCode::Char('=') | KeyCode::Char('+') => NavigationAction::VolumeUp,
        KeyCode::Char('m') => NavigationAction::ToggleMute,
        KeyCode::Char('r') => NavigationAction::ToggleLoop,
        KeyCode::Char('q') => NavigationAction::Quit,
        _ => NavigationAction::None,
    }
}

/// Rate limiter for repeatable transport keys, so a held key does not
/// flood the engine with seek or volume commands.
#[derive(Debug)]
pub struct Throttle {
    window: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// True when enough time has passed since the last accepted fire.
    pub fn fire(&mut self) -> bool {
        let now = Instant::now();
        match self.last {
            Some(last) if now.duration_since(last) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}
