use egui::{Pos2, Rect, Vec2};
use image::RgbaImage;

use crate::error::CanvasError;

/// Raster of an item in its local space.
///
/// Pixel `(u, v)` covers the local area starting at
/// `anchor + origin + (u, v) / density`, where `anchor` is the item position.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub image: RgbaImage,
    pub origin: Vec2,
    pub density: f32,
}

impl Sprite {
    /// Local-space top-left corner of the sprite for an item anchored at `anchor`
    pub fn local_origin(&self, anchor: Pos2) -> Pos2 {
        anchor + self.origin
    }

    /// Local-space area covered by the sprite
    pub fn local_rect(&self, anchor: Pos2) -> Rect {
        Rect::from_min_size(
            self.local_origin(anchor),
            Vec2::new(
                self.image.width() as f32 / self.density,
                self.image.height() as f32 / self.density,
            ),
        )
    }
}

/// Rejects rasters without pixels
pub(crate) fn validate_raster(image: &RgbaImage) -> Result<(), CanvasError> {
    if image.width() == 0 || image.height() == 0 {
        Err(CanvasError::EmptyRaster {
            width: image.width(),
            height: image.height(),
        })
    } else {
        Ok(())
    }
}

/// Size that fits `(width, height)` into a square of side `max_side`,
/// aspect preserved; `None` when it already fits
pub(crate) fn capped_size(width: u32, height: u32, max_side: u32) -> Option<(u32, u32)> {
    let longest = width.max(height);
    if longest <= max_side {
        return None;
    }
    let ratio = max_side as f32 / longest as f32;
    let w = ((width as f32 * ratio).round() as u32).clamp(1, max_side);
    let h = ((height as f32 * ratio).round() as u32).clamp(1, max_side);
    Some((w, h))
}
