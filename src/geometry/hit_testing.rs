use egui::{Pos2, Rect, Vec2};

use super::ItemTransform;
use crate::element::OverlayItem;
use crate::font::FontBook;

/// Whether `point` (screen space) lands on the item's body.
///
/// The point is mapped back through the item's transform and tested against
/// the local bounds grown by `padding`, so rotated items hit where they are
/// drawn.
pub fn hit_body(item: &OverlayItem, point: Pos2, fonts: &FontBook, padding: f32) -> bool {
    let bounds = item.local_bounds(fonts);
    let local = ItemTransform::for_bounds(bounds, item.rotation(), item.scale()).invert(point);
    bounds.expand(padding).contains(local)
}

/// The item drawn on top at `point`, walking items from last to first
pub fn topmost_hit<'a>(
    items: &'a [OverlayItem],
    point: Pos2,
    fonts: &FontBook,
    padding: f32,
) -> Option<&'a OverlayItem> {
    items
        .iter()
        .rev()
        .find(|item| hit_body(item, point, fonts, padding))
}

/// Square touch area of side `side` centered on `center`
pub fn square_around(center: Pos2, side: f32) -> Rect {
    Rect::from_center_size(center, Vec2::splat(side))
}

/// Whether `bounds` stays inside `area` grown by `margin`
pub fn fits_within(bounds: Rect, area: Rect, margin: f32) -> bool {
    area.expand(margin).contains_rect(bounds)
}
