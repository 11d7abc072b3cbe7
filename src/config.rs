use serde::{Deserialize, Serialize};

use crate::error::CanvasError;

/// What happens when an insertion would exceed [`CanvasConfig::max_items`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapPolicy {
    /// Refuse the new item with [`CanvasError::ItemLimitReached`]
    Reject,
    /// Drop the bottom-most (oldest) item to make room
    EvictOldest,
}

/// Tunable parameters for the editing surface.
///
/// Every field has a default, so a JSON document only needs the keys it
/// wants to override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Smallest allowed item scale, must stay strictly positive
    pub min_scale: f32,
    /// Largest allowed item scale
    pub max_scale: f32,

    /// Visible diameter of a control button
    pub button_size: f32,
    /// Touch area of a control button relative to its visible size
    pub button_hit_multiplier: f32,
    /// Extra local-space margin around an item body for selection
    pub body_padding: f32,
    /// Gap between item bounds and the selection border
    pub selection_padding: f32,

    /// Maximum time between two taps on a selected text item (milliseconds)
    pub double_tap_ms: u64,
    /// Finger spacing below which a pinch is ignored
    pub min_pinch_distance: f32,
    /// Whether two-finger gestures also rotate the item
    pub pinch_rotates: bool,

    /// Longest side of a sticker bitmap after insertion
    pub max_sticker_side: u32,
    /// On-screen width a freshly inserted sticker starts at
    pub sticker_initial_width: f32,
    /// Upper bound on the number of overlay items, `None` means unbounded
    pub max_items: Option<usize>,
    pub cap_policy: CapPolicy,

    /// Margin around the background used by the boundary check
    pub boundary_margin: f32,
    /// Alpha the boundary highlight restarts at
    pub highlight_alpha: u8,
    /// Delay before the highlight starts fading (milliseconds)
    pub fade_delay_ms: u64,
    /// Interval between fade ticks (milliseconds)
    pub fade_interval_ms: u64,
    /// Alpha removed per fade tick
    pub fade_step: u8,

    /// Brush width used while drawing
    pub brush_size: f32,
    /// Brush width used while erasing
    pub eraser_size: f32,
    /// Width of the optional static border
    pub border_width: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.05,
            max_scale: 5.0,
            button_size: 55.0,
            button_hit_multiplier: 1.5,
            body_padding: 27.5,
            selection_padding: 10.0,
            double_tap_ms: 300,
            min_pinch_distance: 10.0,
            pinch_rotates: true,
            max_sticker_side: 1024,
            sticker_initial_width: 150.0,
            max_items: None,
            cap_policy: CapPolicy::Reject,
            boundary_margin: 10.0,
            highlight_alpha: 180,
            fade_delay_ms: 500,
            fade_interval_ms: 16,
            fade_step: 5,
            brush_size: 10.0,
            eraser_size: 50.0,
            border_width: 10.0,
        }
    }
}

impl CanvasConfig {
    /// Parse a configuration from JSON, filling in defaults for missing keys
    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub(crate) fn validated(self) -> Result<Self, CanvasError> {
        if !(self.min_scale > 0.0) || self.max_scale < self.min_scale {
            return Err(CanvasError::InvalidConfig(format!(
                "scale range must satisfy 0 < min <= max (min: {}, max: {})",
                self.min_scale, self.max_scale
            )));
        }
        if self.max_sticker_side == 0 {
            return Err(CanvasError::InvalidConfig(
                "max_sticker_side must be at least 1".to_string(),
            ));
        }
        // Either being zero makes the highlight fade never finish
        if self.fade_step == 0 || self.fade_interval_ms == 0 {
            return Err(CanvasError::InvalidConfig(format!(
                "fade_step and fade_interval_ms must be non-zero (step: {}, interval: {}ms)",
                self.fade_step, self.fade_interval_ms
            )));
        }
        Ok(self)
    }

    /// Clamp a scale factor into the allowed range
    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    /// Side length of a control button's square touch area
    pub fn button_hit_size(&self) -> f32 {
        self.button_size * self.button_hit_multiplier
    }
}
