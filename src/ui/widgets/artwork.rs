// src/ui/widgets/artwork.rs
//! Album artwork display widget.

use image::DynamicImage;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders},
    Frame,
};
use ratatui_image::{picker::Picker, protocol::Protocol, Image, Resize};

/// Render the artwork panel.
///
/// Encoding an image into a terminal graphics protocol is expensive, so
/// the encoded form is cached alongside the area it was built for and
/// only rebuilt when the pane is resized. Callers clear the cache when
/// the artwork itself changes.
pub fn render_artwork(
    f: &mut Frame<'_>,
    area: Rect,
    picker: &mut Picker,
    artwork: Option<&DynamicImage>,
    cache: &mut Option<(Rect, Protocol)>,
) {
    f.render_widget(
        Block::default().borders(Borders::ALL).title("3: Artwork"),
        area,
    );

    let Some(image) = artwork else {
        *cache = None;
        return;
    };
    if area.width < 4 || area.height < 3 {
        return;
    }

    // Square draw area filling the pane width, centered vertically.
    let side = (area.width.saturating_sub(2)).min(area.height.saturating_sub(2));
    if side == 0 {
        return;
    }
    let offset_x = area.x + 1 + (area.width.saturating_sub(2) - side) / 2;
    let offset_y = area.y + 1 + (area.height.saturating_sub(2) - side) / 2;
    let draw_area = Rect::new(offset_x, offset_y, side, side);

    let cached = matches!(cache, Some((at, _)) if *at == draw_area);
    if !cached {
        let proto_size = Rect::new(0, 0, side, side);
        match picker.new_protocol(image.clone(), proto_size, Resize::Fit(None)) {
            Ok(proto) => *cache = Some((draw_area, proto)),
            Err(_) => {
                *cache = None;
                return;
            }
        }
    }

    if let Some((_, proto)) = cache {
        f.render_widget(Image::new(proto), draw_area);
    }
}
