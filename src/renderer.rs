use std::collections::HashMap;
use std::collections::hash_map::Entry;

use egui::{Color32, ColorImage};
use image::RgbaImage;
use log::{debug, trace};

use crate::element::{ItemId, ItemKind, OverlayItem, Sprite};
use crate::error::CanvasError;
use crate::font::FontBook;
use crate::gizmo::{ControlStyle, draw_controls};
use crate::highlight::BoundaryHighlight;
use crate::overlay::FrameOverlay;
use crate::raster::{BlendMode, Painter};
use crate::scene::Scene;

/// Number of text sprites kept between frames
pub const DEFAULT_SPRITE_CACHE_SIZE: usize = 64;

const HIGHLIGHT_WIDTH: f32 = 4.0;
const HIGHLIGHT_DASH: f32 = 10.0;
const HIGHLIGHT_GAP: f32 = 10.0;

/// Text is rasterized at multiples of `1 / DENSITY_STEPS`
const DENSITY_STEPS: f32 = 8.0;

/// (item, sprite version, density bits)
type SpriteKey = (ItemId, u64, u32);

/// Caches rasterized text sprites, providing LRU eviction and per-item
/// invalidation
#[derive(Debug)]
pub struct SpriteCache {
    /// Cache of sprites by (item id, version, density)
    sprites: HashMap<SpriteKey, Sprite>,
    /// Tracks when each sprite was last used
    last_used: HashMap<SpriteKey, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of sprites to cache
    max_cache_size: usize,
}

impl SpriteCache {
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            sprites: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size,
        }
    }

    /// Advance the frame counter; call once per rendered frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// The cached sprite for `id` at `version` and `density`, rasterizing it
    /// with `generator` on a miss
    pub fn get_or_create<F>(
        &mut self,
        id: ItemId,
        version: u64,
        density: f32,
        generator: F,
    ) -> Result<&Sprite, CanvasError>
    where
        F: FnOnce() -> Result<Sprite, CanvasError>,
    {
        let key = (id, version, density.to_bits());
        if !self.sprites.contains_key(&key) {
            self.make_room();
        }
        self.last_used.insert(key, self.current_frame);

        match self.sprites.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                trace!("Sprite cache miss for item {} v{} at {:.2}", id, version, density);
                let sprite = match generator() {
                    Ok(sprite) => sprite,
                    Err(err) => {
                        self.last_used.remove(&key);
                        return Err(err);
                    }
                };
                Ok(entry.insert(sprite))
            }
        }
    }

    /// Drop every cached sprite of one item
    pub fn invalidate_item(&mut self, id: ItemId) {
        self.sprites.retain(|(item, _, _), _| *item != id);
        self.last_used.retain(|(item, _, _), _| *item != id);
    }

    /// Drop sprites of items for which `keep` returns false
    pub fn retain_items(&mut self, keep: impl Fn(ItemId) -> bool) {
        self.sprites.retain(|(item, _, _), _| keep(*item));
        self.last_used.retain(|(item, _, _), _| keep(*item));
    }

    pub fn clear(&mut self) {
        self.sprites.clear();
        self.last_used.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.sprites.len()
    }

    /// Evict least recently used sprites until one more fits
    fn make_room(&mut self) {
        if self.max_cache_size == 0 || self.sprites.len() < self.max_cache_size {
            return;
        }

        let mut entries: Vec<(SpriteKey, u64)> = self
            .sprites
            .keys()
            .map(|key| (*key, self.last_used.get(key).copied().unwrap_or(0)))
            .collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = self.sprites.len() + 1 - self.max_cache_size;
        for (key, _) in entries.into_iter().take(to_remove) {
            self.sprites.remove(&key);
            self.last_used.remove(&key);
        }
    }
}

impl Default for SpriteCache {
    fn default() -> Self {
        Self::new(DEFAULT_SPRITE_CACHE_SIZE)
    }
}

/// Software compositor producing preview frames and export rasters
#[derive(Debug, Default)]
pub struct Renderer {
    sprites: SpriteCache,
    style: ControlStyle,
    overlay: FrameOverlay,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn control_style(&self) -> &ControlStyle {
        &self.style
    }

    pub fn set_control_style(&mut self, style: ControlStyle) {
        self.style = style;
    }

    pub fn overlay(&self) -> &FrameOverlay {
        &self.overlay
    }

    pub fn overlay_mut(&mut self) -> &mut FrameOverlay {
        &mut self.overlay
    }

    pub fn sprite_cache(&self) -> &SpriteCache {
        &self.sprites
    }

    /// Render the editing view: every layer plus the selection chrome, the
    /// boundary highlight and, if asked for, the static border
    pub fn render_preview(
        &mut self,
        scene: &Scene,
        highlight: &BoundaryHighlight,
        show_border: bool,
    ) -> Result<RgbaImage, CanvasError> {
        let mut canvas = self.render_layers(scene, true)?;
        let placement = scene.placement();
        let fonts = scene.fonts();
        let config = scene.config();
        let mut painter = Painter::new(&mut canvas);

        if let Some(item) = scene.selected() {
            draw_controls(&mut painter, item, fonts, config, &self.style);
        }

        if highlight.is_visible() && highlight.alpha() > 0 {
            painter.stroke_dashed_rect(
                placement.rect(),
                HIGHLIGHT_WIDTH,
                HIGHLIGHT_DASH,
                HIGHLIGHT_GAP,
                highlight.color(),
            );
        }

        if show_border && scene.has_background() {
            painter.stroke_rect(
                placement.rect().expand(config.border_width / 2.0),
                config.border_width,
                Color32::BLACK,
            );
        }

        Ok(canvas)
    }

    /// Flatten the scene into a raster of the view size without any chrome
    pub fn render_export(&mut self, scene: &Scene) -> Result<RgbaImage, CanvasError> {
        debug!("📤 Exporting {} items", scene.len());
        self.render_layers(scene, false)
    }

    fn render_layers(&mut self, scene: &Scene, with_active_path: bool) -> Result<RgbaImage, CanvasError> {
        self.sprites.begin_frame();
        self.sprites.retain_items(|id| scene.item(id).is_some());

        let (width, height) = scene.view_size();
        let mut canvas = RgbaImage::new(width, height);
        let placement = scene.placement();

        {
            let mut painter = Painter::new(&mut canvas);
            let left = placement.left as i32;
            let top = placement.top as i32;

            if let Some(background) = scene.background() {
                painter.draw_image(background, left, top);
            }

            painter.set_clip(Some(placement.rect()));

            let drawing = scene.drawing();
            let origin = drawing.origin();
            painter.draw_image(drawing.raster(), origin.x as i32, origin.y as i32);

            if with_active_path {
                if let Some(stroke) = drawing.active_stroke() {
                    if !stroke.is_erase() {
                        painter.stroke_polyline(
                            stroke.points(),
                            stroke.thickness(),
                            stroke.color(),
                            BlendMode::SourceOver,
                        );
                    }
                }
            }

            for item in scene.items() {
                self.draw_item(&mut painter, item, scene.fonts())?;
            }
        }

        self.overlay.apply(&mut canvas, &placement);
        Ok(canvas)
    }

    fn draw_item(&mut self, painter: &mut Painter<'_>, item: &OverlayItem, fonts: &FontBook) -> Result<(), CanvasError> {
        let transform = item.transform(fonts);
        match item.kind() {
            ItemKind::Image(image) => {
                painter.draw_transformed(image.bitmap(), item.position(), 1.0, &transform);
            }
            ItemKind::Text(text) => {
                let density = sprite_density(item.scale());
                let sprite = self
                    .sprites
                    .get_or_create(item.id(), item.sprite_version(), density, || {
                        text.rasterize(fonts, density)
                    })?;
                painter.draw_transformed(
                    &sprite.image,
                    sprite.local_origin(item.position()),
                    sprite.density,
                    &transform,
                );
            }
        }
        Ok(())
    }

    /// Convert a rendered raster for upload as an egui texture
    pub fn to_color_image(image: &RgbaImage) -> ColorImage {
        let size = [image.width() as usize, image.height() as usize];
        ColorImage::from_rgba_unmultiplied(size, image.as_raw())
    }
}

/// Rasterization density for a text item shown at `scale`; nearby scales
/// share a sprite so a pinch does not rasterize on every frame
fn sprite_density(scale: f32) -> f32 {
    ((scale * DENSITY_STEPS).round() / DENSITY_STEPS).max(1.0 / DENSITY_STEPS)
}
