use egui::Pos2;
use image::RgbaImage;

use super::{BlendMode, PixelRect, blend_pixel};

/// Single-channel coverage buffer positioned in a target raster.
///
/// Shapes are accumulated with `max`, so overlapping segments of one path do
/// not darken their joints; the mask is then composited once.
#[derive(Debug, Clone)]
pub struct CoverageMask {
    pub x0: i32,
    pub y0: i32,
    pub width: usize,
    pub height: usize,
    data: Vec<f32>,
}

impl CoverageMask {
    pub fn new(x0: i32, y0: i32, width: usize, height: usize) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Mask covering `rect`, or `None` when the rect is empty
    pub fn covering(rect: PixelRect) -> Option<Self> {
        if rect.is_empty() {
            return None;
        }
        Some(Self::new(rect.x0, rect.y0, rect.width() as usize, rect.height() as usize))
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[y * self.width + x]
    }

    /// Raise the coverage of a mask-local pixel
    pub fn add(&mut self, x: usize, y: usize, coverage: f32) {
        if x < self.width && y < self.height {
            let cell = &mut self.data[y * self.width + x];
            *cell = cell.max(coverage.clamp(0.0, 1.0));
        }
    }

    pub fn is_blank(&self) -> bool {
        self.data.iter().all(|&c| c <= 0.0)
    }

    /// Accumulate an anti-aliased capsule (a segment with round caps)
    pub fn add_capsule(&mut self, a: Pos2, b: Pos2, radius: f32) {
        let x_min = ((a.x.min(b.x) - radius - 1.0).floor() as i32 - self.x0).max(0);
        let y_min = ((a.y.min(b.y) - radius - 1.0).floor() as i32 - self.y0).max(0);
        let x_max = ((a.x.max(b.x) + radius + 1.0).ceil() as i32 - self.x0).min(self.width as i32);
        let y_max = ((a.y.max(b.y) + radius + 1.0).ceil() as i32 - self.y0).min(self.height as i32);

        for my in y_min..y_max {
            for mx in x_min..x_max {
                let center = Pos2::new(
                    (mx + self.x0) as f32 + 0.5,
                    (my + self.y0) as f32 + 0.5,
                );
                let distance = distance_to_segment(center, a, b);
                let coverage = radius + 0.5 - distance;
                if coverage > 0.0 {
                    self.add(mx as usize, my as usize, coverage);
                }
            }
        }
    }

    /// Accumulate an anti-aliased filled disc
    pub fn add_disc(&mut self, center: Pos2, radius: f32) {
        self.add_capsule(center, center, radius);
    }

    /// Grow the covered area by `radius` pixels (max filter over a disc)
    pub fn dilate(&self, radius: f32) -> Self {
        if radius <= 0.0 {
            return self.clone();
        }
        let reach = radius.ceil() as i32;
        let mut offsets = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let distance = ((dx * dx + dy * dy) as f32).sqrt();
                let weight = (radius + 0.5 - distance).clamp(0.0, 1.0);
                if weight > 0.0 {
                    offsets.push((dx, dy, weight));
                }
            }
        }

        let mut out = Self::new(self.x0, self.y0, self.width, self.height);
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let mut best = 0.0f32;
                for &(dx, dy, weight) in &offsets {
                    let sx = x + dx;
                    let sy = y + dy;
                    if sx < 0 || sy < 0 || sx >= self.width as i32 || sy >= self.height as i32 {
                        continue;
                    }
                    best = best.max(self.get(sx as usize, sy as usize) * weight);
                    if best >= 1.0 {
                        break;
                    }
                }
                out.data[y as usize * self.width + x as usize] = best;
            }
        }
        out
    }

    /// Soften the mask with two separable box-blur passes
    pub fn blur(&self, radius: f32) -> Self {
        let r = radius.round() as i32;
        if r <= 0 {
            return self.clone();
        }
        let mut out = self.clone();
        for _ in 0..2 {
            out = out.box_blur_horizontal(r).box_blur_vertical(r);
        }
        out
    }

    /// Copy of the mask moved by a whole-pixel offset
    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        let mut out = self.clone();
        out.x0 += dx;
        out.y0 += dy;
        out
    }

    fn box_blur_horizontal(&self, r: i32) -> Self {
        let mut out = Self::new(self.x0, self.y0, self.width, self.height);
        let window = (2 * r + 1) as f32;
        for y in 0..self.height {
            for x in 0..self.width as i32 {
                let mut sum = 0.0;
                for k in (x - r)..=(x + r) {
                    if k >= 0 && k < self.width as i32 {
                        sum += self.get(k as usize, y);
                    }
                }
                out.data[y * self.width + x as usize] = sum / window;
            }
        }
        out
    }

    fn box_blur_vertical(&self, r: i32) -> Self {
        let mut out = Self::new(self.x0, self.y0, self.width, self.height);
        let window = (2 * r + 1) as f32;
        for y in 0..self.height as i32 {
            for x in 0..self.width {
                let mut sum = 0.0;
                for k in (y - r)..=(y + r) {
                    if k >= 0 && k < self.height as i32 {
                        sum += self.get(x, k as usize);
                    }
                }
                out.data[y as usize * self.width + x] = sum / window;
            }
        }
        out
    }

    /// Composite a solid color through the mask onto `target`
    pub fn composite(&self, target: &mut RgbaImage, color: [u8; 4], mode: BlendMode, clip: PixelRect) {
        let bounds = PixelRect::new(
            self.x0,
            self.y0,
            self.x0 + self.width as i32,
            self.y0 + self.height as i32,
        )
        .intersect(clip)
        .intersect(PixelRect::of_image(target));

        for ty in bounds.y0..bounds.y1 {
            for tx in bounds.x0..bounds.x1 {
                let coverage = self.get((tx - self.x0) as usize, (ty - self.y0) as usize);
                if coverage > 0.0 {
                    blend_pixel(target, tx as u32, ty as u32, color, coverage, mode);
                }
            }
        }
    }
}

fn distance_to_segment(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let line = b - a;
    let length_sq = line.length_sq();
    if length_sq == 0.0 {
        return (point - a).length();
    }
    let t = ((point - a).dot(line) / length_sq).clamp(0.0, 1.0);
    (point - (a + line * t)).length()
}
