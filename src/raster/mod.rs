//! Software painter over `image::RgbaImage`.
//!
//! Pixels are stored straight (non-premultiplied) RGBA. Shapes are
//! anti-aliased from their distance to the pixel center; transformed rasters
//! are inverse-mapped and sampled bilinearly in premultiplied space.

mod mask;

pub use mask::CoverageMask;

use egui::{Color32, Pos2, Rect};
use image::{Rgba, RgbaImage};

use crate::geometry::{ItemTransform, map_point};

/// How source coverage combines with the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Regular painting
    SourceOver,
    /// Erase the destination in proportion to coverage
    Clear,
}

/// Half-open integer pixel rectangle `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl PixelRect {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn of_image(image: &RgbaImage) -> Self {
        Self::new(0, 0, image.width() as i32, image.height() as i32)
    }

    /// Smallest pixel rect containing `rect`
    pub fn enclosing(rect: Rect) -> Self {
        Self::new(
            rect.min.x.floor() as i32,
            rect.min.y.floor() as i32,
            rect.max.x.ceil() as i32,
            rect.max.y.ceil() as i32,
        )
    }

    pub fn intersect(self, other: Self) -> Self {
        Self::new(
            self.x0.max(other.x0),
            self.y0.max(other.y0),
            self.x1.min(other.x1),
            self.y1.min(other.y1),
        )
    }

    pub fn width(&self) -> i32 {
        (self.x1 - self.x0).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.y1 - self.y0).max(0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Straight RGBA components of an egui color
pub fn rgba_of(color: Color32) -> [u8; 4] {
    color.to_srgba_unmultiplied()
}

/// Blend one pixel of `color` at `coverage` into `target`
pub fn blend_pixel(target: &mut RgbaImage, x: u32, y: u32, color: [u8; 4], coverage: f32, mode: BlendMode) {
    let dst = target.get_pixel_mut(x, y);
    match mode {
        BlendMode::SourceOver => {
            let src_a = color[3] as f32 / 255.0 * coverage.clamp(0.0, 1.0);
            if src_a <= 0.0 {
                return;
            }
            let src = [color[0] as f32, color[1] as f32, color[2] as f32, src_a];
            composite_straight(dst, src);
        }
        BlendMode::Clear => {
            let keep = 1.0 - coverage.clamp(0.0, 1.0);
            dst.0[3] = (dst.0[3] as f32 * keep).round() as u8;
        }
    }
}

/// Source-over of a straight color with alpha in `[0, 1]`
fn composite_straight(dst: &mut Rgba<u8>, src: [f32; 4]) {
    let src_a = src[3];
    let dst_a = dst.0[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        dst.0 = [0, 0, 0, 0];
        return;
    }
    for c in 0..3 {
        let value = (src[c] * src_a + dst.0[c] as f32 * dst_a * (1.0 - src_a)) / out_a;
        dst.0[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Painter bound to a target raster and an optional clip rectangle
pub struct Painter<'a> {
    target: &'a mut RgbaImage,
    clip: PixelRect,
}

impl<'a> Painter<'a> {
    pub fn new(target: &'a mut RgbaImage) -> Self {
        let clip = PixelRect::of_image(target);
        Self { target, clip }
    }

    pub fn target(&self) -> &RgbaImage {
        self.target
    }

    /// Restrict painting to `rect` (in addition to the raster bounds)
    pub fn set_clip(&mut self, rect: Option<Rect>) {
        let full = PixelRect::of_image(self.target);
        self.clip = match rect {
            Some(rect) => full.intersect(PixelRect::enclosing(rect)),
            None => full,
        };
    }

    pub fn clip(&self) -> PixelRect {
        self.clip
    }

    pub fn fill(&mut self, color: Color32) {
        let rgba = rgba_of(color);
        for y in self.clip.y0..self.clip.y1 {
            for x in self.clip.x0..self.clip.x1 {
                blend_pixel(self.target, x as u32, y as u32, rgba, 1.0, BlendMode::SourceOver);
            }
        }
    }

    /// Composite `src` with its top-left corner at the given pixel
    pub fn draw_image(&mut self, src: &RgbaImage, left: i32, top: i32) {
        let area = PixelRect::new(left, top, left + src.width() as i32, top + src.height() as i32)
            .intersect(self.clip);
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let pixel = src.get_pixel((x - left) as u32, (y - top) as u32);
                if pixel.0[3] == 0 {
                    continue;
                }
                blend_pixel(self.target, x as u32, y as u32, pixel.0, 1.0, BlendMode::SourceOver);
            }
        }
    }

    /// Composite `src` through an item transform.
    ///
    /// Pixel `(u, v)` of `src` covers the local-space area starting at
    /// `origin + (u, v) / density`.
    pub fn draw_transformed(&mut self, src: &RgbaImage, origin: Pos2, density: f32, transform: &ItemTransform) {
        let local = Rect::from_min_size(
            origin,
            egui::vec2(src.width() as f32 / density, src.height() as f32 / density),
        );
        let area = PixelRect::enclosing(transform.bounding_rect(local)).intersect(self.clip);
        if area.is_empty() {
            return;
        }

        let inverse = transform.inverse_matrix();
        for y in area.y0..area.y1 {
            for x in area.x0..area.x1 {
                let screen = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let local = if transform.is_identity() { screen } else { map_point(&inverse, screen) };
                let u = (local.x - origin.x) * density - 0.5;
                let v = (local.y - origin.y) * density - 0.5;
                if let Some(sample) = sample_bilinear(src, u, v) {
                    composite_straight(self.target.get_pixel_mut(x as u32, y as u32), sample);
                }
            }
        }
    }

    /// Stroke an open polyline with round joins and caps
    pub fn stroke_polyline(&mut self, points: &[Pos2], width: f32, color: Color32, mode: BlendMode) {
        let Some(mut mask) = self.mask_for(points, width / 2.0) else {
            return;
        };
        let radius = width / 2.0;
        match points {
            [] => return,
            [single] => mask.add_disc(*single, radius),
            _ => {
                for pair in points.windows(2) {
                    mask.add_capsule(pair[0], pair[1], radius);
                }
            }
        }
        mask.composite(self.target, rgba_of(color), mode, self.clip);
    }

    pub fn stroke_segment(&mut self, a: Pos2, b: Pos2, width: f32, color: Color32) {
        self.stroke_polyline(&[a, b], width, color, BlendMode::SourceOver);
    }

    /// Stroke a closed polygon
    pub fn stroke_polygon(&mut self, corners: &[Pos2], width: f32, color: Color32) {
        if let Some(first) = corners.first() {
            let mut closed = corners.to_vec();
            closed.push(*first);
            self.stroke_polyline(&closed, width, color, BlendMode::SourceOver);
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: Color32) {
        self.stroke_polygon(
            &[rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()],
            width,
            color,
        );
    }

    /// Stroke a rectangle outline as alternating dashes and gaps
    pub fn stroke_dashed_rect(&mut self, rect: Rect, width: f32, dash: f32, gap: f32, color: Color32) {
        let corners = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()];
        let Some(mut mask) = self.mask_for(&corners, width / 2.0) else {
            return;
        };
        let radius = width / 2.0;
        let period = dash + gap;
        for i in 0..4 {
            let a = corners[i];
            let b = corners[(i + 1) % 4];
            let length = (b - a).length();
            if length <= 0.0 || period <= 0.0 {
                continue;
            }
            let dir = (b - a) / length;
            let mut t = 0.0;
            while t < length {
                let end = (t + dash).min(length);
                mask.add_capsule(a + dir * t, a + dir * end, radius);
                t += period;
            }
        }
        mask.composite(self.target, rgba_of(color), BlendMode::SourceOver, self.clip);
    }

    pub fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let Some(mut mask) = self.mask_for(&[center], radius) else {
            return;
        };
        mask.add_disc(center, radius);
        mask.composite(self.target, rgba_of(color), BlendMode::SourceOver, self.clip);
    }

    /// Stroke a circular arc; angles in degrees, clockwise on screen
    pub fn stroke_arc(&mut self, center: Pos2, radius: f32, start: f32, sweep: f32, width: f32, color: Color32) {
        let steps = ((sweep.abs() / 6.0).ceil() as usize).max(2);
        let points: Vec<Pos2> = (0..=steps)
            .map(|i| {
                let angle = (start + sweep * i as f32 / steps as f32).to_radians();
                Pos2::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
            })
            .collect();
        self.stroke_polyline(&points, width, color, BlendMode::SourceOver);
    }

    /// Blank coverage mask big enough for a shape around `points`
    fn mask_for(&self, points: &[Pos2], reach: f32) -> Option<CoverageMask> {
        let mut bounds = Rect::NOTHING;
        for p in points {
            bounds.extend_with(*p);
        }
        if !bounds.is_positive() && points.is_empty() {
            return None;
        }
        let area = PixelRect::enclosing(bounds.expand(reach + 1.0)).intersect(self.clip);
        CoverageMask::covering(area)
    }
}

/// Bilinear sample at continuous texel coordinates, straight RGBA out with
/// alpha in `[0, 1]`; texels outside the raster count as transparent
fn sample_bilinear(src: &RgbaImage, u: f32, v: f32) -> Option<[f32; 4]> {
    let (w, h) = (src.width() as i32, src.height() as i32);
    if u <= -1.0 || v <= -1.0 || u >= w as f32 || v >= h as f32 {
        return None;
    }

    let x0 = u.floor() as i32;
    let y0 = v.floor() as i32;
    let fx = u - x0 as f32;
    let fy = v - y0 as f32;

    let mut acc = [0.0f32; 4];
    for (dx, dy, weight) in [
        (0, 0, (1.0 - fx) * (1.0 - fy)),
        (1, 0, fx * (1.0 - fy)),
        (0, 1, (1.0 - fx) * fy),
        (1, 1, fx * fy),
    ] {
        if weight <= 0.0 {
            continue;
        }
        let (sx, sy) = (x0 + dx, y0 + dy);
        if sx < 0 || sy < 0 || sx >= w || sy >= h {
            continue;
        }
        let texel = src.get_pixel(sx as u32, sy as u32).0;
        let alpha = texel[3] as f32 / 255.0 * weight;
        acc[0] += texel[0] as f32 * alpha;
        acc[1] += texel[1] as f32 * alpha;
        acc[2] += texel[2] as f32 * alpha;
        acc[3] += alpha;
    }

    if acc[3] <= 1e-6 {
        return None;
    }
    Some([acc[0] / acc[3], acc[1] / acc[3], acc[2] / acc[3], acc[3].min(1.0)])
}
