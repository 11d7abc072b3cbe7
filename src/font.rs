//! Font registry and text metrics for text overlays.
//!
//! Families are looked up by name and weight. Missing weights fall back to the
//! family's regular face with synthetic bold/italic, and unknown families fall
//! back to the bundled egui proportional font.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::CanvasError;

/// Horizontal shear applied for synthetic italics
pub const ITALIC_SHEAR: f32 = 0.2;

/// Font weight/slant requested by a text style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Italic,
    BoldItalic,
}

impl FontWeight {
    pub fn is_bold(&self) -> bool {
        matches!(self, FontWeight::Bold | FontWeight::BoldItalic)
    }

    pub fn is_italic(&self) -> bool {
        matches!(self, FontWeight::Italic | FontWeight::BoldItalic)
    }
}

/// Vertical metrics for a font at a given size, all positive distances
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    /// Distance from the baseline up to the top of the tallest glyphs
    pub ascent: f32,
    /// Distance from the baseline down to the bottom of the lowest glyphs
    pub descent: f32,
    /// Baseline-to-baseline advance between lines
    pub line_spacing: f32,
}

/// A font face picked for a style, plus the synthetic effects it still needs
#[derive(Clone)]
pub struct ResolvedFont {
    font: FontArc,
    family: String,
    synthetic_bold: bool,
    synthetic_italic: bool,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("family", &self.family)
            .field("synthetic_bold", &self.synthetic_bold)
            .field("synthetic_italic", &self.synthetic_italic)
            .finish_non_exhaustive()
    }
}

impl ResolvedFont {
    pub fn font(&self) -> &FontArc {
        &self.font
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn synthetic_bold(&self) -> bool {
        self.synthetic_bold
    }

    pub fn synthetic_italic(&self) -> bool {
        self.synthetic_italic
    }

    /// Pixel scale where `size` is the em size, matching how text sizes are
    /// specified by style records
    pub fn px_scale(&self, size: f32) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * self.font.height_unscaled() / units_per_em)
    }

    pub fn metrics(&self, size: f32) -> TextMetrics {
        let scaled = self.font.as_scaled(self.px_scale(size));
        let ascent = scaled.ascent();
        let descent = -scaled.descent();
        TextMetrics {
            ascent,
            descent,
            line_spacing: ascent + descent + scaled.line_gap(),
        }
    }

    /// Glyphs of a single line with their x offsets from the line start
    pub fn layout_line(&self, line: &str, size: f32) -> (Vec<(GlyphId, f32)>, f32) {
        let scaled = self.font.as_scaled(self.px_scale(size));
        let mut glyphs = Vec::with_capacity(line.len());
        let mut cursor_x = 0.0f32;
        let mut last_glyph: Option<GlyphId> = None;

        for ch in line.chars() {
            let glyph_id = self.font.glyph_id(ch);
            if let Some(prev) = last_glyph {
                cursor_x += scaled.kern(prev, glyph_id);
            }
            glyphs.push((glyph_id, cursor_x));
            cursor_x += scaled.h_advance(glyph_id);
            last_glyph = Some(glyph_id);
        }

        // Synthetic bold widens each glyph by one pixel column
        if self.synthetic_bold && !glyphs.is_empty() {
            cursor_x += 1.0;
        }

        (glyphs, cursor_x)
    }

    pub fn line_width(&self, line: &str, size: f32) -> f32 {
        self.layout_line(line, size).1
    }
}

/// Registry of font faces keyed by family name and weight
pub struct FontBook {
    faces: HashMap<(String, FontWeight), FontArc>,
    fallback: FontArc,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.faces.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl FontBook {
    /// Font book whose fallback is egui's bundled proportional font
    pub fn with_default_fonts() -> Result<Self, CanvasError> {
        let definitions = egui::FontDefinitions::default();
        let name = definitions
            .families
            .get(&egui::FontFamily::Proportional)
            .and_then(|names| names.first())
            .ok_or_else(|| CanvasError::InvalidFont("proportional".to_string()))?;
        let data = definitions
            .font_data
            .get(name)
            .ok_or_else(|| CanvasError::InvalidFont(name.clone()))?;

        info!("🔤 Using bundled font '{}' as fallback", name);
        Self::with_fallback(data.font.to_vec())
    }

    /// Font book with caller-provided fallback font bytes
    pub fn with_fallback(bytes: Vec<u8>) -> Result<Self, CanvasError> {
        let fallback = FontArc::try_from_vec(bytes)
            .map_err(|_| CanvasError::InvalidFont("fallback".to_string()))?;
        Ok(Self {
            faces: HashMap::new(),
            fallback,
        })
    }

    /// Register a face for a family and weight, replacing any previous one
    pub fn register(&mut self, family: &str, weight: FontWeight, bytes: Vec<u8>) -> Result<(), CanvasError> {
        let font = FontArc::try_from_vec(bytes).map_err(|_| CanvasError::InvalidFont(family.to_string()))?;
        debug!("Registered font face {family} ({weight:?})");
        self.faces.insert((family.to_string(), weight), font);
        Ok(())
    }

    pub fn contains(&self, family: &str, weight: FontWeight) -> bool {
        self.faces.contains_key(&(family.to_string(), weight))
    }

    /// Pick the best face for a family/weight, never failing
    pub fn resolve(&self, family: &str, weight: FontWeight) -> ResolvedFont {
        if let Some(font) = self.faces.get(&(family.to_string(), weight)) {
            return ResolvedFont {
                font: font.clone(),
                family: family.to_string(),
                synthetic_bold: false,
                synthetic_italic: false,
            };
        }

        let base = self
            .faces
            .get(&(family.to_string(), FontWeight::Normal))
            .unwrap_or(&self.fallback);
        ResolvedFont {
            font: base.clone(),
            family: family.to_string(),
            synthetic_bold: weight.is_bold(),
            synthetic_italic: weight.is_italic(),
        }
    }
}
