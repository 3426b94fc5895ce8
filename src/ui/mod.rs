// src/ui/mod.rs
//! Terminal interface: layout, widgets, keybindings, and the run loop.

pub mod icons;
pub mod keybindings;
pub mod layout;
pub mod tui;
pub mod widgets;

pub use tui::run;
