use egui::{Pos2, Rect, Vec2};

mod common;
pub(crate) mod image;
pub(crate) mod text;

pub use common::Sprite;
pub use self::image::ImageItem;
pub use text::{DEFAULT_TEXT_SIZE, FallbackPaint, TextItem, TextStyle};

pub use crate::id_generator::ItemId;
use crate::config::CanvasConfig;
use crate::font::FontBook;
use crate::geometry::{ItemTransform, normalize_degrees};

/// Capabilities shared by every kind of overlay content
pub trait Element {
    /// Short name of the content kind, for logs
    fn element_type(&self) -> &'static str;

    /// Unrotated, unscaled bounds of the content when anchored at `anchor`
    fn local_bounds(&self, anchor: Pos2, fonts: &FontBook) -> Rect;
}

/// Enumeration of all overlay content kinds
#[derive(Debug, Clone)]
pub enum ItemKind {
    Text(TextItem),
    Image(ImageItem),
}

impl Element for ItemKind {
    fn element_type(&self) -> &'static str {
        match self {
            ItemKind::Text(t) => t.element_type(),
            ItemKind::Image(i) => i.element_type(),
        }
    }

    fn local_bounds(&self, anchor: Pos2, fonts: &FontBook) -> Rect {
        match self {
            ItemKind::Text(t) => t.local_bounds(anchor, fonts),
            ItemKind::Image(i) => i.local_bounds(anchor, fonts),
        }
    }
}

/// A movable, rotatable, scalable item layered over the background.
///
/// `position` is the top-left corner for images and the baseline-left point
/// of the first line for text. Rotation and scale apply about the center of
/// the current local bounds.
#[derive(Debug, Clone)]
pub struct OverlayItem {
    id: ItemId,
    position: Pos2,
    scale: f32,
    rotation: f32,
    selected: bool,
    double_tap_count: u32,
    sprite_version: u64,
    kind: ItemKind,
}

impl OverlayItem {
    pub(crate) fn new(id: ItemId, kind: ItemKind, position: Pos2) -> Self {
        Self {
            id,
            position,
            scale: 1.0,
            rotation: 0.0,
            selected: false,
            double_tap_count: 0,
            sprite_version: 0,
            kind,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ItemKind::Text(_))
    }

    pub fn as_text(&self) -> Option<&TextItem> {
        match &self.kind {
            ItemKind::Text(t) => Some(t),
            ItemKind::Image(_) => None,
        }
    }

    /// Mutable access to text content; invalidates the cached sprite
    pub fn as_text_mut(&mut self) -> Option<&mut TextItem> {
        match &mut self.kind {
            ItemKind::Text(t) => {
                self.sprite_version += 1;
                Some(t)
            }
            ItemKind::Image(_) => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageItem> {
        match &self.kind {
            ItemKind::Image(i) => Some(i),
            ItemKind::Text(_) => None,
        }
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }

    pub fn set_position(&mut self, position: Pos2) {
        self.position = position;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the scale, clamped into the configured range
    pub fn set_scale(&mut self, scale: f32, config: &CanvasConfig) {
        self.scale = config.clamp_scale(scale);
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the rotation in degrees, normalized into `[0, 360)`
    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = normalize_degrees(degrees);
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Number of edit requests raised by double taps on this item
    pub fn double_tap_count(&self) -> u32 {
        self.double_tap_count
    }

    pub(crate) fn record_double_tap(&mut self) {
        self.double_tap_count += 1;
    }

    /// Changes whenever the item's local-space appearance changes
    pub fn sprite_version(&self) -> u64 {
        self.sprite_version
    }

    pub fn invalidate_sprite(&mut self) {
        self.sprite_version += 1;
    }

    pub fn local_bounds(&self, fonts: &FontBook) -> Rect {
        self.kind.local_bounds(self.position, fonts)
    }

    pub fn transform(&self, fonts: &FontBook) -> ItemTransform {
        ItemTransform::for_bounds(self.local_bounds(fonts), self.rotation, self.scale)
    }

    /// Screen positions of the item's corners, clockwise from the local
    /// top-left
    pub fn screen_corners(&self, fonts: &FontBook) -> [Pos2; 4] {
        let bounds = self.local_bounds(fonts);
        ItemTransform::for_bounds(bounds, self.rotation, self.scale).corners(bounds)
    }

    /// Axis-aligned screen bounds of the transformed item
    pub fn screen_bounds(&self, fonts: &FontBook) -> Rect {
        let bounds = self.local_bounds(fonts);
        ItemTransform::for_bounds(bounds, self.rotation, self.scale).bounding_rect(bounds)
    }
}

impl Element for OverlayItem {
    fn element_type(&self) -> &'static str {
        self.kind.element_type()
    }

    fn local_bounds(&self, anchor: Pos2, fonts: &FontBook) -> Rect {
        self.kind.local_bounds(anchor, fonts)
    }
}
