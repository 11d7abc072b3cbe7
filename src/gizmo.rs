use egui::{Color32, Pos2, Rect};

use crate::config::CanvasConfig;
use crate::element::OverlayItem;
use crate::font::FontBook;
use crate::geometry::square_around;
use crate::raster::Painter;

/// Button size the icon stroke widths in [`ControlStyle`] are tuned for
const REFERENCE_BUTTON_SIZE: f32 = 55.0;

/// Control buttons shown on the selected item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlButton {
    /// Top-right corner, removes the item
    Delete,
    /// Bottom-left corner, spins the item about its center
    Rotate,
}

impl ControlButton {
    /// Buttons in hit-test order
    pub const ALL: [ControlButton; 2] = [ControlButton::Delete, ControlButton::Rotate];

    /// Corner of the local bounds the button is pinned to
    pub fn local_anchor(&self, bounds: Rect) -> Pos2 {
        match self {
            ControlButton::Delete => bounds.right_top(),
            ControlButton::Rotate => bounds.left_bottom(),
        }
    }
}

/// Paint parameters for selection chrome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlStyle {
    pub border_color: Color32,
    pub border_width: f32,
    pub delete_fill: Color32,
    pub rotate_fill: Color32,
    pub icon_color: Color32,
    pub icon_width: f32,
}

impl Default for ControlStyle {
    fn default() -> Self {
        Self {
            border_color: Color32::BLUE,
            border_width: 2.0,
            delete_fill: Color32::RED,
            rotate_fill: Color32::GREEN,
            icon_color: Color32::WHITE,
            icon_width: 6.0,
        }
    }
}

impl ControlStyle {
    /// Icon stroke width for a given button size
    pub fn icon_width_for(&self, button_size: f32) -> f32 {
        (self.icon_width * button_size / REFERENCE_BUTTON_SIZE).max(1.0)
    }
}

/// Screen position of a control button's center
pub fn control_anchor(item: &OverlayItem, button: ControlButton, fonts: &FontBook) -> Pos2 {
    let bounds = item.local_bounds(fonts);
    item.transform(fonts).apply(button.local_anchor(bounds))
}

/// Square touch area of a control button
pub fn control_hit_rect(item: &OverlayItem, button: ControlButton, fonts: &FontBook, config: &CanvasConfig) -> Rect {
    square_around(control_anchor(item, button, fonts), config.button_hit_size())
}

/// The control button of `item` under `point`, delete first
pub fn hit_control(item: &OverlayItem, point: Pos2, fonts: &FontBook, config: &CanvasConfig) -> Option<ControlButton> {
    ControlButton::ALL
        .into_iter()
        .find(|button| control_hit_rect(item, *button, fonts, config).contains(point))
}

/// Screen corners of the selection border, which sits
/// `selection_padding` outside the item bounds and turns with the item
pub fn selection_outline(item: &OverlayItem, fonts: &FontBook, config: &CanvasConfig) -> [Pos2; 4] {
    let bounds = item.local_bounds(fonts);
    item.transform(fonts).corners(bounds.expand(config.selection_padding))
}

/// Paint the selection border and both control buttons for `item`
pub fn draw_controls(
    painter: &mut Painter<'_>,
    item: &OverlayItem,
    fonts: &FontBook,
    config: &CanvasConfig,
    style: &ControlStyle,
) {
    painter.stroke_polygon(
        &selection_outline(item, fonts, config),
        style.border_width,
        style.border_color,
    );

    let size = config.button_size;
    let icon_width = style.icon_width_for(size);

    let delete = control_anchor(item, ControlButton::Delete, fonts);
    painter.fill_circle(delete, size / 2.0, style.delete_fill);
    let arm = size / 3.0;
    painter.stroke_segment(
        Pos2::new(delete.x - arm, delete.y - arm),
        Pos2::new(delete.x + arm, delete.y + arm),
        icon_width,
        style.icon_color,
    );
    painter.stroke_segment(
        Pos2::new(delete.x + arm, delete.y - arm),
        Pos2::new(delete.x - arm, delete.y + arm),
        icon_width,
        style.icon_color,
    );

    let rotate = control_anchor(item, ControlButton::Rotate, fonts);
    painter.fill_circle(rotate, size / 2.0, style.rotate_fill);
    let radius = size / 2.5;
    painter.stroke_arc(rotate, radius, 45.0, 270.0, icon_width, style.icon_color);
    let tip = Pos2::new(rotate.x + radius * 0.8, rotate.y - radius * 0.8);
    let head = radius * 0.6;
    painter.stroke_segment(tip, Pos2::new(tip.x - head, tip.y), icon_width, style.icon_color);
    painter.stroke_segment(tip, Pos2::new(tip.x, tip.y + head), icon_width, style.icon_color);
}
