// src/ui/layout.rs
//! Layout computation for the UI panels.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Visibility state for UI sections.
#[derive(Debug, Clone, Copy)]
pub struct SectionVisibility {
    pub files: bool,
    pub player: bool,
    pub artwork: bool,
}

impl Default for SectionVisibility {
    fn default() -> Self {
        Self {
            files: true,
            player: true,
            artwork: true,
        }
    }
}

impl SectionVisibility {
    /// Toggle a section by number (1-3).
    pub fn toggle(&mut self, section: usize) {
        match section {
            1 => self.files = !self.files,
            2 => self.player = !self.player,
            3 => self.artwork = !self.artwork,
            _ => {}
        }
    }
}

/// Computed layout areas for rendering.
pub struct ComputedLayout {
    /// Column areas, one per visible section
    pub columns: Vec<Rect>,
    /// Order of sections in columns
    pub section_order: Vec<&'static str>,
}

/// Compute the column layout based on total area and section visibility.
/// Hidden sections give up their space; the remaining weights are
/// renormalized so visible columns always fill the terminal.
pub fn compute_layout(area: Rect, visibility: &SectionVisibility) -> ComputedLayout {
    let mut section_order = Vec::new();
    let mut weights = Vec::new();

    if visibility.files {
        section_order.push("files");
        weights.push(18u16);
    }
    if visibility.player {
        section_order.push("player");
        weights.push(54u16);
    }
    if visibility.artwork {
        section_order.push("artwork");
        weights.push(28u16);
    }

    let columns: Vec<Rect> = if !weights.is_empty() {
        let sum: u16 = weights.iter().copied().sum();
        let constraints: Vec<Constraint> = weights
            .into_iter()
            .map(|w| Constraint::Percentage((w as u32 * 100 / sum as u32) as u16))
            .collect();
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area)
            .iter()
            .cloned()
            .collect()
    } else {
        // If no columns visible, create a single full-width column
        vec![area]
    };

    ComputedLayout {
        columns,
        section_order,
    }
}
