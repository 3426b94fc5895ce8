// src/ui/widgets/file_list.rs
//! File browser list widget.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::fs::FileCategory;
use crate::ui::icons::entry_icon;

/// Render the file browser list. The entry at `playing` (if any) is
/// marked and tinted so the active track stays visible while browsing.
pub fn render_file_list(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    entries: &[(String, bool, FileCategory, String)],
    state: &mut ListState,
    playing: Option<usize>,
) {
    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, (name, is_dir, category, _))| {
            let label = format!("{} {}", entry_icon(*is_dir, *category), name);
            if playing == Some(i) {
                ListItem::new(format!("{} ♪", label))
                    .style(Style::default().fg(Color::Green))
            } else {
                ListItem::new(label)
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string()),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, state);
}
