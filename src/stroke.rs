use egui::{Color32, Pos2, Vec2};
use image::RgbaImage;
use log::{debug, info};

use crate::config::CanvasConfig;
use crate::raster::{BlendMode, Painter};

/// A freehand path being drawn, in screen coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct MutableStroke {
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
    erase: bool,
}

impl MutableStroke {
    pub fn new(start: Pos2, color: Color32, thickness: f32, erase: bool) -> Self {
        Self {
            points: vec![start],
            color,
            thickness,
            erase,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn is_erase(&self) -> bool {
        self.erase
    }

    pub fn blend_mode(&self) -> BlendMode {
        if self.erase { BlendMode::Clear } else { BlendMode::SourceOver }
    }
}

/// Transparent raster that freehand strokes are committed into.
///
/// The raster has the placed background's pixel size and its top-left pixel
/// sits at `origin` on screen. Brush strokes accumulate in an active path and
/// are committed on pointer-up; eraser strokes are committed segment by
/// segment so the erased area shows immediately.
#[derive(Debug, Clone)]
pub struct DrawingLayer {
    raster: RgbaImage,
    origin: Pos2,
    enabled: bool,
    erase: bool,
    brush_color: Color32,
    brush_size: f32,
    eraser_size: f32,
    active: Option<MutableStroke>,
}

impl DrawingLayer {
    pub fn new(width: u32, height: u32, origin: Pos2, config: &CanvasConfig) -> Self {
        Self {
            raster: RgbaImage::new(width, height),
            origin,
            enabled: false,
            erase: false,
            brush_color: Color32::BLACK,
            brush_size: config.brush_size,
            eraser_size: config.eraser_size,
            active: None,
        }
    }

    /// Replace the raster with a transparent one of a new size and position,
    /// leaving drawing and erase mode off
    pub fn reset(&mut self, width: u32, height: u32, origin: Pos2) {
        info!("✏️ Drawing layer reset to {}x{} at {:?}", width, height, origin);
        self.raster = RgbaImage::new(width, height);
        self.origin = origin;
        self.enabled = false;
        self.erase = false;
        self.active = None;
    }

    pub fn raster(&self) -> &RgbaImage {
        &self.raster
    }

    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    /// Clear every committed stroke
    pub fn clear(&mut self) {
        for pixel in self.raster.pixels_mut() {
            pixel.0 = [0, 0, 0, 0];
        }
        self.active = None;
        info!("🧽 Cleared drawings");
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turn drawing mode on or off; erase mode is always switched off
    pub fn set_enabled(&mut self, enabled: bool) {
        self.erase = false;
        self.enabled = enabled;
        if !enabled {
            self.active = None;
        }
    }

    pub fn is_erasing(&self) -> bool {
        self.erase
    }

    pub fn set_erase_mode(&mut self, erase: bool) {
        self.erase = erase;
    }

    pub fn brush_color(&self) -> Color32 {
        self.brush_color
    }

    /// Pick a brush color, which also enables drawing and leaves erase mode
    pub fn set_brush_color(&mut self, color: Color32) {
        self.erase = false;
        self.enabled = true;
        self.brush_color = color;
    }

    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush_size = size.max(0.0);
    }

    pub fn eraser_size(&self) -> f32 {
        self.eraser_size
    }

    /// Width of the next stroke in the current mode
    pub fn current_width(&self) -> f32 {
        if self.erase { self.eraser_size } else { self.brush_size }
    }

    pub fn active_stroke(&self) -> Option<&MutableStroke> {
        self.active.as_ref()
    }

    /// Start a new path at `point`, discarding any uncommitted one
    pub fn begin(&mut self, point: Pos2) {
        self.active = Some(MutableStroke::new(
            point,
            self.brush_color,
            self.current_width(),
            self.erase,
        ));
    }

    /// Extend the active path; in erase mode the segment is committed at once
    /// and the path restarts at `point`
    pub fn extend(&mut self, point: Pos2) {
        let Some(stroke) = self.active.as_mut() else {
            self.begin(point);
            return;
        };
        stroke.add_point(point);

        if stroke.is_erase() {
            self.commit();
            self.begin(point);
        }
    }

    /// Paint the active path into the raster
    pub fn commit(&mut self) {
        if let Some(stroke) = self.active.take() {
            debug!(
                "Committing {} stroke with {} points",
                if stroke.is_erase() { "erase" } else { "brush" },
                stroke.points().len()
            );
            self.paint(&stroke);
        }
    }

    /// Drop the active path without painting it
    pub fn cancel(&mut self) {
        self.active = None;
    }

    fn paint(&mut self, stroke: &MutableStroke) {
        let offset: Vec2 = self.origin.to_vec2();
        let points: Vec<Pos2> = stroke.points().iter().map(|p| *p - offset).collect();
        Painter::new(&mut self.raster).stroke_polyline(
            &points,
            stroke.thickness(),
            stroke.color(),
            stroke.blend_mode(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer() -> DrawingLayer {
        let mut layer = DrawingLayer::new(100, 100, Pos2::new(50.0, 50.0), &CanvasConfig::default());
        layer.set_enabled(true);
        layer
    }

    #[test]
    fn test_brush_path_is_committed_on_commit_only() {
        let mut layer = layer();
        layer.begin(Pos2::new(60.0, 100.0));
        layer.extend(Pos2::new(140.0, 100.0));
        assert_eq!(layer.raster().get_pixel(50, 50).0[3], 0);
        layer.commit();
        // screen (100, 100) is raster (50, 50)
        assert_eq!(layer.raster().get_pixel(50, 50).0, [0, 0, 0, 255]);
        assert!(layer.active_stroke().is_none());
    }

    #[test]
    fn test_eraser_commits_each_segment() {
        let mut layer = layer();
        layer.begin(Pos2::new(60.0, 100.0));
        layer.extend(Pos2::new(140.0, 100.0));
        layer.commit();

        layer.set_erase_mode(true);
        layer.begin(Pos2::new(90.0, 100.0));
        layer.extend(Pos2::new(110.0, 100.0));
        assert_eq!(layer.raster().get_pixel(50, 50).0[3], 0);
        assert_eq!(layer.active_stroke().map(|s| s.points().len()), Some(1));
    }

    #[test]
    fn test_cancel_discards_path() {
        let mut layer = layer();
        layer.begin(Pos2::new(60.0, 100.0));
        layer.extend(Pos2::new(140.0, 100.0));
        layer.cancel();
        layer.commit();
        assert!(layer.raster().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn test_brush_color_enables_drawing() {
        let mut layer = DrawingLayer::new(10, 10, Pos2::ZERO, &CanvasConfig::default());
        layer.set_erase_mode(true);
        layer.set_brush_color(Color32::BLUE);
        assert!(layer.is_enabled());
        assert!(!layer.is_erasing());
        assert_eq!(layer.current_width(), 10.0);
    }
}
