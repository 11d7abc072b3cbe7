//! Scene model: overlay items over a placed background and a drawing layer.

use egui::{Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage, imageops};
use log::{debug, info, warn};

use crate::config::{CanvasConfig, CapPolicy};
use crate::element::{Element, ImageItem, ItemId, ItemKind, OverlayItem, TextItem, TextStyle};
use crate::error::CanvasError;
use crate::event::{CanvasEvent, EventBus};
use crate::font::FontBook;
use crate::id_generator::IdGenerator;
use crate::stroke::DrawingLayer;

/// Text anchor used when no background has been assigned yet
pub const UNPLACED_TEXT_ANCHOR: Pos2 = Pos2::new(300.0, 900.0);

/// Where the (scaled) background sits inside the view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    /// Placement of a `width` x `height` raster with its top-left at
    /// `(left, top)`
    pub fn new(left: f32, top: f32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            right: left + width as f32,
            bottom: top + height as f32,
            width,
            height,
        }
    }

    /// Placement covering the whole view
    pub fn full_view(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_max(Pos2::new(self.left, self.top), Pos2::new(self.right, self.bottom))
    }

    pub fn origin(&self) -> Pos2 {
        Pos2::new(self.left, self.top)
    }

    pub fn center(&self) -> Pos2 {
        self.rect().center()
    }

    /// Whether a screen point lies on the background, edges included
    pub fn contains(&self, point: Pos2) -> bool {
        point.x >= self.left && point.x <= self.right && point.y >= self.top && point.y <= self.bottom
    }
}

/// Ordered overlay items over a background raster and a freehand layer.
///
/// Items paint in insertion order, so the last item is on top and is hit
/// first. At most one item is selected at any time. Changes that a host may
/// want to hear about are posted to the scene's [`EventBus`] and delivered
/// when it is flushed.
#[derive(Debug)]
pub struct Scene {
    config: CanvasConfig,
    fonts: FontBook,
    ids: IdGenerator,
    items: Vec<OverlayItem>,
    view_size: (u32, u32),
    background: Option<RgbaImage>,
    original: Option<RgbaImage>,
    placement: Placement,
    drawing: DrawingLayer,
    events: EventBus,
}

impl Scene {
    pub fn new(view_width: u32, view_height: u32, fonts: FontBook, config: CanvasConfig) -> Self {
        let placement = Placement::full_view(view_width, view_height);
        let drawing = DrawingLayer::new(view_width, view_height, placement.origin(), &config);
        Self {
            config,
            fonts,
            ids: IdGenerator::default(),
            items: Vec::new(),
            view_size: (view_width, view_height),
            background: None,
            original: None,
            placement,
            drawing,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Replace the configuration; item scales are re-clamped into the new range
    pub fn set_config(&mut self, config: CanvasConfig) {
        for item in &mut self.items {
            let scale = item.scale();
            item.set_scale(scale, &config);
        }
        self.config = config;
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    pub fn view_size(&self) -> (u32, u32) {
        self.view_size
    }

    /// Set the view size used for fitting backgrounds and for export.
    ///
    /// Without a background the placement and drawing layer follow the view;
    /// an existing background keeps its placement until it is set again.
    pub fn resize_view(&mut self, width: u32, height: u32) {
        debug!("View resized to {}x{}", width, height);
        self.view_size = (width, height);
        if self.background.is_none() {
            self.placement = Placement::full_view(width, height);
            self.drawing.reset(width, height, self.placement.origin());
        }
    }

    // --- items ---

    pub fn items(&self) -> &[OverlayItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, id: ItemId) -> Option<&OverlayItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut OverlayItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    fn index_of(&self, id: ItemId) -> Result<usize, CanvasError> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or(CanvasError::UnknownItem(id))
    }

    /// Append a text item, selected, near the middle of the background.
    ///
    /// With a style the style's own text is shown; without one the item uses
    /// the red 60px fallback paint.
    pub fn add_text(&mut self, text: &str, style: Option<TextStyle>) -> Result<ItemId, CanvasError> {
        let mut item = TextItem::new(text);
        if let Some(style) = style {
            item.set_style(style);
        }

        let position = if self.background.is_some() {
            let p = self.placement;
            Pos2::new(
                p.left + p.width as f32 / 4.0,
                p.top + p.height as f32 / 2.0 + item.size() / 2.0,
            )
        } else {
            UNPLACED_TEXT_ANCHOR
        };

        self.insert(ItemKind::Text(item), position, 1.0)
    }

    /// Append a sticker, selected, centered on the background (or the view
    /// when there is none) and scaled to the configured initial width
    pub fn add_sticker(&mut self, bitmap: RgbaImage) -> Result<ItemId, CanvasError> {
        let sticker = ImageItem::new(bitmap, self.config.max_sticker_side)?;
        self.insert_sticker(sticker)
    }

    /// Decode encoded image bytes and append them as a sticker
    pub fn add_sticker_bytes(&mut self, bytes: &[u8]) -> Result<ItemId, CanvasError> {
        let sticker = ImageItem::from_bytes(bytes, self.config.max_sticker_side)?;
        self.insert_sticker(sticker)
    }

    fn insert_sticker(&mut self, sticker: ImageItem) -> Result<ItemId, CanvasError> {
        let (width, height) = sticker.bitmap().dimensions();
        let center = if self.background.is_some() {
            self.placement.center()
        } else {
            Pos2::new(self.view_size.0 as f32 / 2.0, self.view_size.1 as f32 / 2.0)
        };
        let position = center - Vec2::new(width as f32 / 2.0, height as f32 / 2.0);
        let scale = self.config.sticker_initial_width / width as f32;

        self.insert(ItemKind::Image(sticker), position, scale)
    }

    fn insert(&mut self, kind: ItemKind, position: Pos2, scale: f32) -> Result<ItemId, CanvasError> {
        if let Some(limit) = self.config.max_items {
            if self.items.len() >= limit {
                match self.config.cap_policy {
                    CapPolicy::Reject => {
                        warn!("⛔ Item limit of {} reached, rejecting insertion", limit);
                        return Err(CanvasError::ItemLimitReached(limit));
                    }
                    CapPolicy::EvictOldest => {
                        if self.items.is_empty() {
                            return Err(CanvasError::ItemLimitReached(limit));
                        }
                        let evicted = self.items.remove(0);
                        info!("♻️ Evicted oldest item {} to stay under {} items", evicted.id(), limit);
                        self.events.post(CanvasEvent::ItemDeleted(evicted.id()));
                    }
                }
            }
        }

        self.clear_selection_flags();
        self.drawing.set_enabled(false);

        let id = self.ids.generate();
        let mut item = OverlayItem::new(id, kind, position);
        item.set_scale(scale, &self.config);
        item.set_selected(true);
        info!(
            "➕ Added {} item {} at {:?} (scale {:.3})",
            item.element_type(),
            id,
            position,
            item.scale()
        );
        self.items.push(item);

        self.events.post(CanvasEvent::ItemAdded(id));
        self.events.post(CanvasEvent::SelectionChanged(Some(id)));
        Ok(id)
    }

    /// Remove an item; the selection is cleared
    pub fn delete(&mut self, id: ItemId) -> Result<(), CanvasError> {
        let index = self.index_of(id)?;
        self.items.remove(index);
        self.clear_selection_flags();
        info!("🗑️ Deleted item {}", id);
        self.events.post(CanvasEvent::ItemDeleted(id));
        self.events.post(CanvasEvent::SelectionChanged(None));
        Ok(())
    }

    /// Select one item, deselecting every other
    pub fn select(&mut self, id: ItemId) -> Result<(), CanvasError> {
        self.index_of(id)?;
        let changed = self.selected_id() != Some(id);
        for item in &mut self.items {
            item.set_selected(item.id() == id);
        }
        if changed {
            debug!("Selected item {}", id);
            self.events.post(CanvasEvent::SelectionChanged(Some(id)));
        }
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        if self.selected_id().is_some() {
            self.clear_selection_flags();
            debug!("Selection cleared");
            self.events.post(CanvasEvent::SelectionChanged(None));
        }
    }

    fn clear_selection_flags(&mut self) {
        for item in &mut self.items {
            item.set_selected(false);
        }
    }

    pub fn selected(&self) -> Option<&OverlayItem> {
        self.items.iter().find(|item| item.is_selected())
    }

    pub fn selected_mut(&mut self) -> Option<&mut OverlayItem> {
        self.items.iter_mut().find(|item| item.is_selected())
    }

    pub fn selected_id(&self) -> Option<ItemId> {
        self.selected().map(OverlayItem::id)
    }

    /// Replace a text item's style snapshot (and with it, its text)
    pub fn update_text_style(&mut self, id: ItemId, style: TextStyle) -> Result<(), CanvasError> {
        let item = self.item_mut(id).ok_or(CanvasError::UnknownItem(id))?;
        let text = item.as_text_mut().ok_or(CanvasError::NotTextItem(id))?;
        text.set_style(style);
        debug!("Updated style of text item {}", id);
        Ok(())
    }

    /// Move an item's anchor to `position`
    pub fn move_item_to(&mut self, id: ItemId, position: Pos2) -> Result<(), CanvasError> {
        let item = self.item_mut(id).ok_or(CanvasError::UnknownItem(id))?;
        item.set_position(position);
        Ok(())
    }

    pub(crate) fn notify(&mut self, event: CanvasEvent) {
        self.events.post(event);
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Take the notifications posted since the last flush without
    /// delivering them, oldest first
    pub fn drain_events(&mut self) -> Vec<CanvasEvent> {
        self.events.take_pending()
    }

    // --- background & drawing ---

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }

    /// The background as placed (scaled to fit the view)
    pub fn background(&self) -> Option<&RgbaImage> {
        self.background.as_ref()
    }

    /// The unscaled background kept for [`Scene::reset_to_original`]
    pub fn original_background(&self) -> Option<&RgbaImage> {
        self.original.as_ref()
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn drawing(&self) -> &DrawingLayer {
        &self.drawing
    }

    pub fn drawing_mut(&mut self) -> &mut DrawingLayer {
        &mut self.drawing
    }

    /// Assign a new background.
    ///
    /// `Some` keeps an unscaled copy for resets and fits the raster into the
    /// view, centered. `None` drops the copy and uses an opaque white raster
    /// of the view size. Either way the drawing layer is recreated, items are
    /// removed and drawing/erase mode is switched off.
    pub fn set_background(&mut self, bitmap: Option<RgbaImage>) -> Result<(), CanvasError> {
        match bitmap {
            Some(bitmap) => {
                self.place_background(&bitmap)?;
                self.original = Some(bitmap);
            }
            None => {
                let (width, height) = self.view_size;
                if width == 0 || height == 0 {
                    return Err(CanvasError::EmptyRaster { width, height });
                }
                self.original = None;
                self.background = Some(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])));
                self.placement = Placement::full_view(width, height);
                info!("🖼️ White background of {}x{}", width, height);
            }
        }

        self.drawing
            .reset(self.placement.width, self.placement.height, self.placement.origin());
        if !self.items.is_empty() {
            let had_selection = self.selected_id().is_some();
            for item in self.items.drain(..) {
                self.events.post(CanvasEvent::ItemDeleted(item.id()));
            }
            if had_selection {
                self.events.post(CanvasEvent::SelectionChanged(None));
            }
        }
        self.events.post(CanvasEvent::PlacementChanged(self.placement));
        Ok(())
    }

    /// Install a crop result as the new background.
    ///
    /// The crop becomes the original that [`Scene::reset_to_original`]
    /// returns to; items and drawings are dropped as for any new background.
    pub fn apply_crop(&mut self, bitmap: &RgbaImage) -> Result<(), CanvasError> {
        info!("✂️ Installing {}x{} crop result", bitmap.width(), bitmap.height());
        self.set_background(Some(bitmap.clone()))
    }

    /// Re-apply the original background; no-op without one
    pub fn reset_to_original(&mut self) -> Result<(), CanvasError> {
        match self.original.clone() {
            Some(original) => {
                info!("↩️ Resetting to original background");
                self.set_background(Some(original))
            }
            None => {
                debug!("No original background to reset to");
                Ok(())
            }
        }
    }

    pub fn clear_drawings(&mut self) {
        self.drawing.clear();
    }

    /// Replace the background with a transparent raster of the same size,
    /// keeping drawings, items and placement
    pub fn clear_background(&mut self) {
        if let Some(background) = self.background.as_mut() {
            let (width, height) = background.dimensions();
            *background = RgbaImage::new(width, height);
            info!("🧹 Cleared background ({}x{})", width, height);
        }
    }

    fn place_background(&mut self, bitmap: &RgbaImage) -> Result<(), CanvasError> {
        let (width, height) = bitmap.dimensions();
        let (view_width, view_height) = self.view_size;
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyRaster { width, height });
        }
        if view_width == 0 || view_height == 0 {
            return Err(CanvasError::EmptyRaster {
                width: view_width,
                height: view_height,
            });
        }

        let factor = (view_width as f32 / width as f32).min(view_height as f32 / height as f32);
        let scaled_width = ((width as f32 * factor) as u32).clamp(1, view_width);
        let scaled_height = ((height as f32 * factor) as u32).clamp(1, view_height);

        let scaled = if (scaled_width, scaled_height) == (width, height) {
            bitmap.clone()
        } else {
            imageops::resize(bitmap, scaled_width, scaled_height, imageops::FilterType::Triangle)
        };

        self.placement = Placement::new(
            ((view_width - scaled_width) / 2) as f32,
            ((view_height - scaled_height) / 2) as f32,
            scaled_width,
            scaled_height,
        );
        self.background = Some(scaled);
        info!(
            "🖼️ Background {}x{} placed as {}x{} at ({}, {})",
            width, height, scaled_width, scaled_height, self.placement.left, self.placement.top
        );
        Ok(())
    }
}
