// src/ui/widgets/player_panel.rs
//! Player information panel widget.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::audio::{AudioSettings, TrackMetadata};
use crate::player::{AudioStates, SliderState};

/// Render the player information panel. Returns the progress bar area
/// so mouse events can be mapped back onto the slider.
#[allow(clippy::too_many_arguments)]
pub fn render_player_panel(
    f: &mut Frame<'_>,
    area: Rect,
    metadata: Option<&TrackMetadata>,
    source: Option<&str>,
    slider: SliderState,
    states: &AudioStates,
    settings: &AudioSettings,
    status: Option<&str>,
) -> Option<Rect> {
    f.render_widget(
        Block::default().borders(Borders::ALL).title("2: Player"),
        area,
    );
    if area.width < 4 || area.height < 8 {
        return None;
    }

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    render_track_info(f, inner[0], metadata, source);
    render_transport_line(f, inner[1], states, settings);
    render_status_line(f, inner[2], status);
    render_progress(f, inner[3], slider);
    Some(inner[3])
}

fn render_track_info(
    f: &mut Frame<'_>,
    area: Rect,
    metadata: Option<&TrackMetadata>,
    source: Option<&str>,
) {
    let Some(source) = source else {
        f.render_widget(
            Paragraph::new("No track playing").wrap(Wrap { trim: true }),
            area,
        );
        return;
    };

    let mut lines: Vec<Line> = Vec::new();
    match metadata {
        Some(meta) => {
            lines.push(Line::from(Span::styled(
                meta.display_title(source),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if let Some(artist) = &meta.artist {
                lines.push(Line::from(format!("Artist: {}", artist)));
            }
            if let Some(album) = &meta.album {
                lines.push(Line::from(format!("Album: {}", album)));
            }
            lines.push(Line::from(format!("Duration: {}s", meta.duration_secs)));
            for (k, v) in &meta.tags {
                lines.push(Line::from(format!("{}: {}", k, v)));
            }
            for (k, v) in &meta.properties {
                lines.push(Line::from(format!("{}: {}", k, v)));
            }
        }
        None => {
            // Metadata still loading, or a remote stream without tags.
            lines.push(Line::from(Span::styled(
                source.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
        }
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_transport_line(
    f: &mut Frame<'_>,
    area: Rect,
    states: &AudioStates,
    settings: &AudioSettings,
) {
    let play_pause_icon = if states.is_paused {
        Span::styled(" ⏵ ", Style::default().fg(Color::Yellow))
    } else if states.is_playing {
        Span::styled(" ⏸ ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ⏵ ", Style::default().fg(Color::Gray))
    };

    let loop_span = if settings.loop_enabled {
        Span::styled(" loop ", Style::default().fg(Color::Cyan))
    } else {
        Span::styled(" loop ", Style::default().fg(Color::DarkGray))
    };

    let volume_span = if settings.muted {
        Span::styled(" muted ", Style::default().fg(Color::Red))
    } else {
        Span::raw(format!(" vol {:.0}% ", settings.volume * 100.0))
    };

    let controls = Line::from(vec![
        play_pause_icon,
        Span::raw(" "),
        loop_span,
        Span::raw(" "),
        volume_span,
    ]);
    f.render_widget(Paragraph::new(controls).alignment(Alignment::Center), area);
}

fn render_status_line(f: &mut Frame<'_>, area: Rect, status: Option<&str>) {
    if let Some(message) = status {
        f.render_widget(
            Paragraph::new(Span::styled(
                message.to_string(),
                Style::default().fg(Color::Red),
            ))
            .alignment(Alignment::Center),
            area,
        );
    }
}

fn render_progress(f: &mut Frame<'_>, area: Rect, slider: SliderState) {
    let duration = slider.duration.max(0.0);
    let ratio = if duration > 0.0 {
        (slider.progress / duration).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let label = format!(
        "{} / {}",
        format_time(slider.progress),
        format_time(duration)
    );

    f.render_widget(
        Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::ITALIC),
            )
            .ratio(ratio)
            .label(label),
        area,
    );
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
