use egui::{Pos2, Rect, Vec2};
use image::{RgbaImage, imageops};
use log::info;

use super::Element;
use super::common::{self, capped_size};
use crate::error::CanvasError;
use crate::font::FontBook;

/// Sticker overlay backed by a decoded bitmap
#[derive(Clone)]
pub struct ImageItem {
    bitmap: RgbaImage,
}

// Custom Debug so test failures don't dump every pixel
impl std::fmt::Debug for ImageItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageItem")
            .field("width", &self.bitmap.width())
            .field("height", &self.bitmap.height())
            .finish()
    }
}

impl ImageItem {
    /// Take ownership of `bitmap`, downscaling it so its longest side is at
    /// most `max_side`
    pub fn new(bitmap: RgbaImage, max_side: u32) -> Result<Self, CanvasError> {
        common::validate_raster(&bitmap)?;

        let bitmap = match capped_size(bitmap.width(), bitmap.height(), max_side) {
            Some((w, h)) => {
                info!(
                    "🖼️ Downscaling sticker {}x{} -> {}x{}",
                    bitmap.width(),
                    bitmap.height(),
                    w,
                    h
                );
                imageops::resize(&bitmap, w, h, imageops::FilterType::Triangle)
            }
            None => bitmap,
        };

        Ok(Self { bitmap })
    }

    /// Decode an encoded image (PNG, JPEG, ...) into a sticker
    pub fn from_bytes(bytes: &[u8], max_side: u32) -> Result<Self, CanvasError> {
        let decoded = image::load_from_memory(bytes)?;
        Self::new(decoded.to_rgba8(), max_side)
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.bitmap.width() as f32, self.bitmap.height() as f32)
    }
}

impl Element for ImageItem {
    fn element_type(&self) -> &'static str {
        "image"
    }

    fn local_bounds(&self, anchor: Pos2, _fonts: &FontBook) -> Rect {
        Rect::from_min_size(anchor, self.size())
    }
}
