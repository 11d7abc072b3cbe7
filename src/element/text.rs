use ab_glyph::{Font, point};
use egui::{Color32, Pos2, Rect};
use image::RgbaImage;
use log::debug;
use serde::{Deserialize, Serialize};

use super::Element;
use super::common::Sprite;
use crate::error::CanvasError;
use crate::font::{FontBook, FontWeight, ITALIC_SHEAR};
use crate::raster::{BlendMode, CoverageMask, PixelRect, rgba_of};

pub const DEFAULT_TEXT_SIZE: f32 = 60.0;

/// Style record for a text overlay, as produced by a text-editing screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    pub text: String,
    pub color: Color32,
    pub size: f32,
    pub font_family: String,
    pub weight: FontWeight,

    pub stroke_enabled: bool,
    pub stroke_color: Color32,
    pub stroke_width: f32,

    pub shadow_enabled: bool,
    pub shadow_color: Color32,
    pub shadow_radius: f32,
    pub shadow_dx: f32,
    pub shadow_dy: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: "Sample Text".to_string(),
            color: Color32::BLACK,
            size: DEFAULT_TEXT_SIZE,
            font_family: "sans-serif".to_string(),
            weight: FontWeight::Normal,
            stroke_enabled: false,
            stroke_color: Color32::BLACK,
            stroke_width: 2.0,
            shadow_enabled: false,
            shadow_color: Color32::from_rgba_unmultiplied(0, 0, 0, 128),
            shadow_radius: 5.0,
            shadow_dx: 5.0,
            shadow_dy: 5.0,
        }
    }
}

/// Paint used for text that has no style attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackPaint {
    pub color: Color32,
    pub size: f32,
}

impl Default for FallbackPaint {
    fn default() -> Self {
        Self {
            color: Color32::RED,
            size: DEFAULT_TEXT_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Shadow {
    color: Color32,
    radius: f32,
    dx: f32,
    dy: f32,
}

/// Effective drawing parameters after style/fallback resolution
#[derive(Debug, Clone)]
struct TextPaint<'a> {
    color: Color32,
    size: f32,
    family: &'a str,
    weight: FontWeight,
    stroke: Option<(f32, Color32)>,
    shadow: Option<Shadow>,
}

impl TextPaint<'_> {
    /// Room needed around the glyph bounds for stroke, shadow and slant
    fn margin(&self, ascent: f32) -> f32 {
        let mut margin = 2.0;
        if let Some((width, _)) = self.stroke {
            margin += width / 2.0;
        }
        if let Some(shadow) = self.shadow {
            margin += shadow.radius * 2.0 + shadow.dx.abs().max(shadow.dy.abs());
        }
        if self.weight.is_italic() {
            margin += ascent * ITALIC_SHEAR;
        }
        margin
    }
}

/// Text overlay: a possibly multi-line string anchored at the baseline of
/// its first line
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    text: String,
    style: Option<TextStyle>,
    fallback: FallbackPaint,
}

impl TextItem {
    /// Unstyled text drawn with the fallback paint
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
            fallback: FallbackPaint::default(),
        }
    }

    /// Styled text; the style's own text replaces the item text
    pub fn with_style(style: TextStyle) -> Self {
        Self {
            text: style.text.clone(),
            style: Some(style),
            fallback: FallbackPaint::default(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn style(&self) -> Option<&TextStyle> {
        self.style.as_ref()
    }

    /// Attach a style snapshot, adopting its text
    pub fn set_style(&mut self, style: TextStyle) {
        self.text = style.text.clone();
        self.style = Some(style);
    }

    pub fn fallback(&self) -> FallbackPaint {
        self.fallback
    }

    pub fn set_fallback(&mut self, fallback: FallbackPaint) {
        self.fallback = fallback;
    }

    /// Em size the text is drawn at
    pub fn size(&self) -> f32 {
        self.style.as_ref().map_or(self.fallback.size, |s| s.size)
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }

    fn paint(&self) -> TextPaint<'_> {
        match &self.style {
            Some(style) => TextPaint {
                color: style.color,
                size: style.size,
                family: &style.font_family,
                weight: style.weight,
                stroke: style
                    .stroke_enabled
                    .then_some((style.stroke_width, style.stroke_color)),
                shadow: style.shadow_enabled.then_some(Shadow {
                    color: style.shadow_color,
                    radius: style.shadow_radius,
                    dx: style.shadow_dx,
                    dy: style.shadow_dy,
                }),
            },
            None => TextPaint {
                color: self.fallback.color,
                size: self.fallback.size,
                family: "sans-serif",
                weight: FontWeight::Normal,
                stroke: None,
                shadow: None,
            },
        }
    }

    /// Render the text into a local-space sprite with `density` pixels per
    /// local unit.
    ///
    /// Layers, bottom to top: stroke shadow, stroke, fill shadow, fill.
    pub fn rasterize(&self, fonts: &FontBook, density: f32) -> Result<Sprite, CanvasError> {
        let paint = self.paint();
        let font = fonts.resolve(paint.family, paint.weight);
        let metrics = font.metrics(paint.size);

        let area = self
            .local_bounds(Pos2::ZERO, fonts)
            .expand(paint.margin(metrics.ascent));
        let width = (area.width() * density).ceil().max(1.0) as u32;
        let height = (area.height() * density).ceil().max(1.0) as u32;
        let origin = area.min.to_vec2();

        let px_size = paint.size * density;
        let scale = font.px_scale(px_size);
        let spacing = font.metrics(px_size).line_spacing;
        let start_x = -origin.x * density;

        let mut fill = CoverageMask::new(0, 0, width as usize, height as usize);
        for (index, line) in self.lines().enumerate() {
            let baseline = -origin.y * density + index as f32 * spacing;
            let (glyphs, _) = font.layout_line(line, px_size);
            for (glyph_id, x) in glyphs {
                let glyph = glyph_id.with_scale_and_position(scale, point(start_x + x, baseline));
                let Some(outlined) = font.font().outline_glyph(glyph) else {
                    continue;
                };
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    let mut px = bounds.min.x + gx as f32;
                    let py = bounds.min.y + gy as f32;
                    if font.synthetic_italic() {
                        px += (baseline - py) * ITALIC_SHEAR;
                    }
                    let (ix, iy) = (px.round() as i64, py.round() as i64);
                    if ix < 0 || iy < 0 {
                        return;
                    }
                    fill.add(ix as usize, iy as usize, coverage);
                    if font.synthetic_bold() {
                        fill.add(ix as usize + 1, iy as usize, coverage);
                    }
                });
            }
        }

        let mut image = RgbaImage::new(width, height);
        let clip = PixelRect::of_image(&image);

        let mut passes = Vec::with_capacity(2);
        if let Some((stroke_width, stroke_color)) = paint.stroke {
            passes.push((fill.dilate(stroke_width / 2.0 * density), stroke_color));
        }
        passes.push((fill, paint.color));

        for (mask, color) in &passes {
            if let Some(shadow) = paint.shadow {
                mask.blur(shadow.radius * density)
                    .shifted(
                        (shadow.dx * density).round() as i32,
                        (shadow.dy * density).round() as i32,
                    )
                    .composite(&mut image, rgba_of(shadow.color), BlendMode::SourceOver, clip);
            }
            mask.composite(&mut image, rgba_of(*color), BlendMode::SourceOver, clip);
        }

        debug!(
            "Rasterized text sprite {}x{} at density {:.2} ({} passes)",
            width,
            height,
            density,
            passes.len()
        );

        Ok(Sprite { image, origin, density })
    }
}

impl Element for TextItem {
    fn element_type(&self) -> &'static str {
        "text"
    }

    fn local_bounds(&self, anchor: Pos2, fonts: &FontBook) -> Rect {
        let paint = self.paint();
        let font = fonts.resolve(paint.family, paint.weight);
        let metrics = font.metrics(paint.size);

        let mut line_count = 0usize;
        let mut widest = 0.0f32;
        for line in self.lines() {
            line_count += 1;
            widest = widest.max(font.line_width(line, paint.size));
        }

        Rect::from_min_max(
            Pos2::new(anchor.x, anchor.y - metrics.ascent),
            Pos2::new(
                anchor.x + widest,
                anchor.y + (line_count.saturating_sub(1)) as f32 * metrics.line_spacing + metrics.descent,
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fonts() -> FontBook {
        FontBook::with_default_fonts().unwrap()
    }

    #[test]
    fn test_style_replaces_text() {
        let mut item = TextItem::new("old");
        item.set_style(TextStyle {
            text: "new".to_string(),
            ..Default::default()
        });
        assert_eq!(item.text(), "new");
        assert_eq!(item.size(), DEFAULT_TEXT_SIZE);
    }

    #[test]
    fn test_bounds_follow_font_metrics() {
        let fonts = fonts();
        let item = TextItem::new("Hello");
        let metrics = fonts.resolve("sans-serif", FontWeight::Normal).metrics(60.0);
        let bounds = item.local_bounds(Pos2::new(100.0, 200.0), &fonts);
        assert_eq!(bounds.left(), 100.0);
        assert!((bounds.top() - (200.0 - metrics.ascent)).abs() < 1e-3);
        assert!((bounds.bottom() - (200.0 + metrics.descent)).abs() < 1e-3);
        assert!(bounds.width() > 0.0);
    }

    #[test]
    fn test_multi_line_bounds_grow_by_line_spacing() {
        let fonts = fonts();
        let one = TextItem::new("ab").local_bounds(Pos2::ZERO, &fonts);
        let three = TextItem::new("ab\nab\nab").local_bounds(Pos2::ZERO, &fonts);
        let spacing = fonts.resolve("sans-serif", FontWeight::Normal).metrics(60.0).line_spacing;
        assert!((three.height() - one.height() - 2.0 * spacing).abs() < 1e-3);
        assert!((three.width() - one.width()).abs() < 1e-3);
    }

    #[test]
    fn test_rasterized_text_has_ink_in_fallback_color() {
        let sprite = TextItem::new("W").rasterize(&fonts(), 1.0).unwrap();
        let red = sprite
            .image
            .pixels()
            .any(|p| p.0 == [255, 0, 0, 255]);
        assert!(red);
    }

    #[test]
    fn test_stroke_draws_outside_the_fill() {
        let fonts = fonts();
        let plain = TextItem::with_style(TextStyle {
            text: "I".to_string(),
            ..Default::default()
        });
        let stroked = TextItem::with_style(TextStyle {
            text: "I".to_string(),
            color: Color32::WHITE,
            stroke_enabled: true,
            stroke_width: 6.0,
            ..Default::default()
        });
        let count_ink = |sprite: &Sprite| sprite.image.pixels().filter(|p| p.0[3] > 0).count();
        let plain_ink = count_ink(&plain.rasterize(&fonts, 1.0).unwrap());
        let stroked_ink = count_ink(&stroked.rasterize(&fonts, 1.0).unwrap());
        assert!(stroked_ink > plain_ink);
    }

    #[test]
    fn test_sprite_covers_bounds() {
        let fonts = fonts();
        let item = TextItem::new("Hi\nthere");
        let sprite = item.rasterize(&fonts, 2.0).unwrap();
        let bounds = item.local_bounds(Pos2::ZERO, &fonts);
        let covered = sprite.local_rect(Pos2::ZERO);
        assert!(covered.contains_rect(bounds));
        assert_eq!(sprite.density, 2.0);
    }
}
