//! Decorative frame and color filter composited over the finished canvas.

use image::{RgbaImage, imageops};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::raster::{Painter, PixelRect};
use crate::scene::Placement;

/// 4x5 color matrix over straight RGBA in `0..=255`.
///
/// Row `i` computes channel `i` as
/// `m[i][0]*R + m[i][1]*G + m[i][2]*B + m[i][3]*A + m[i][4]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorMatrix(pub [f32; 20]);

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorMatrix {
    #[rustfmt::skip]
    pub const IDENTITY: ColorMatrix = ColorMatrix([
        1.0, 0.0, 0.0, 0.0, 0.0,
        0.0, 1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 1.0, 0.0, 0.0,
        0.0, 0.0, 0.0, 1.0, 0.0,
    ]);

    /// Saturation adjustment; 0 is grayscale, 1 leaves colors unchanged
    pub fn saturation(amount: f32) -> Self {
        let inv = 1.0 - amount;
        let r = 0.213 * inv;
        let g = 0.715 * inv;
        let b = 0.072 * inv;
        #[rustfmt::skip]
        let m = [
            r + amount, g, b, 0.0, 0.0,
            r, g + amount, b, 0.0, 0.0,
            r, g, b + amount, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ];
        ColorMatrix(m)
    }

    pub fn grayscale() -> Self {
        Self::saturation(0.0)
    }

    #[rustfmt::skip]
    pub fn sepia() -> Self {
        ColorMatrix([
            0.393, 0.769, 0.189, 0.0, 0.0,
            0.349, 0.686, 0.168, 0.0, 0.0,
            0.272, 0.534, 0.131, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    /// Shift RGB by `offset` (in `0..=255` units)
    #[rustfmt::skip]
    pub fn brightness(offset: f32) -> Self {
        ColorMatrix([
            1.0, 0.0, 0.0, 0.0, offset,
            0.0, 1.0, 0.0, 0.0, offset,
            0.0, 0.0, 1.0, 0.0, offset,
            0.0, 0.0, 0.0, 1.0, 0.0,
        ])
    }

    pub fn apply(&self, pixel: [u8; 4]) -> [u8; 4] {
        let input = pixel.map(f32::from);
        let mut out = [0u8; 4];
        for (channel, row) in self.0.chunks_exact(5).enumerate() {
            let value = row[0] * input[0] + row[1] * input[1] + row[2] * input[2] + row[3] * input[3] + row[4];
            out[channel] = value.round().clamp(0.0, 255.0) as u8;
        }
        out
    }

    /// Filter every pixel of `image` inside `area`
    pub fn apply_to(&self, image: &mut RgbaImage, area: PixelRect) {
        let area = area.intersect(PixelRect::of_image(image));
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let pixel = image.get_pixel_mut(x as u32, y as u32);
                pixel.0 = self.apply(pixel.0);
            }
        }
    }
}

/// Optional color filter plus an optional frame raster, stretched over the
/// background placement and drawn on top of everything else
#[derive(Debug, Clone, Default)]
pub struct FrameOverlay {
    frame: Option<RgbaImage>,
    filter: Option<ColorMatrix>,
    /// `frame` resized to the last placement
    scaled: Option<RgbaImage>,
}

impl FrameOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Option<&RgbaImage> {
        self.frame.as_ref()
    }

    pub fn set_frame(&mut self, frame: Option<RgbaImage>) {
        info!(
            "🖼️ Frame overlay {}",
            if frame.is_some() { "set" } else { "removed" }
        );
        self.frame = frame;
        self.scaled = None;
    }

    pub fn filter(&self) -> Option<ColorMatrix> {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Option<ColorMatrix>) {
        self.filter = filter;
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_none() && self.filter.is_none()
    }

    /// Filter the placement area of `canvas`, then draw the frame over it
    pub fn apply(&mut self, canvas: &mut RgbaImage, placement: &Placement) {
        let area = PixelRect::new(
            placement.left as i32,
            placement.top as i32,
            placement.left as i32 + placement.width as i32,
            placement.top as i32 + placement.height as i32,
        );

        if let Some(filter) = self.filter {
            filter.apply_to(canvas, area);
        }

        let Some(frame) = &self.frame else {
            return;
        };
        if placement.width == 0 || placement.height == 0 {
            return;
        }

        let stale = self
            .scaled
            .as_ref()
            .is_none_or(|scaled| scaled.dimensions() != (placement.width, placement.height));
        if stale {
            debug!("Scaling frame to {}x{}", placement.width, placement.height);
            self.scaled = Some(imageops::resize(
                frame,
                placement.width,
                placement.height,
                imageops::FilterType::Triangle,
            ));
        }

        if let Some(scaled) = &self.scaled {
            Painter::new(canvas).draw_image(scaled, area.x0, area.y0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_identity_matrix_keeps_pixels() {
        assert_eq!(ColorMatrix::IDENTITY.apply([12, 34, 56, 78]), [12, 34, 56, 78]);
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let [r, g, b, a] = ColorMatrix::grayscale().apply([200, 40, 90, 255]);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_filter_is_limited_to_placement() {
        let mut canvas = RgbaImage::from_pixel(4, 4, Rgba([100, 100, 100, 255]));
        let mut overlay = FrameOverlay::new();
        overlay.set_filter(Some(ColorMatrix::brightness(50.0)));
        overlay.apply(&mut canvas, &Placement::new(0.0, 0.0, 2, 4));
        assert_eq!(canvas.get_pixel(1, 1).0, [150, 150, 150, 255]);
        assert_eq!(canvas.get_pixel(3, 1).0, [100, 100, 100, 255]);
    }

    #[test]
    fn test_frame_is_stretched_over_placement() {
        let mut canvas = RgbaImage::new(10, 10);
        let mut overlay = FrameOverlay::new();
        overlay.set_frame(Some(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 255, 255]))));
        overlay.apply(&mut canvas, &Placement::new(2.0, 2.0, 6, 6));
        assert_eq!(canvas.get_pixel(2, 2).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(7, 7).0, [0, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(1, 1).0[3], 0);
    }
}
