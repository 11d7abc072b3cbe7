//! The editing surface a host embeds.
//!
//! [`EditorCanvas`] owns the scene, the gesture machine, the boundary
//! highlight and the renderer. Every [`CanvasEvent`](crate::event::CanvasEvent)
//! the scene raises reaches the subscribed handlers once the call that raised
//! it finishes.

use std::time::Duration;

use egui::{Color32, ColorImage, Context, Rect};
use image::RgbaImage;
use log::info;

use crate::config::CanvasConfig;
use crate::element::{ItemId, OverlayItem, TextStyle};
use crate::error::CanvasError;
use crate::event::{EventBus, EventHandler, EventKind, SubscriptionId};
use crate::font::FontBook;
use crate::gizmo::ControlStyle;
use crate::highlight::{BoundaryHighlight, FadeTick};
use crate::input::{GestureMachine, GestureState, InputHandler, TouchEvent};
use crate::overlay::ColorMatrix;
use crate::renderer::Renderer;
use crate::scene::{Placement, Scene};

#[derive(Debug)]
pub struct EditorCanvas {
    scene: Scene,
    gestures: GestureMachine,
    highlight: BoundaryHighlight,
    renderer: Renderer,
    input: InputHandler,
    show_border: bool,
}

impl EditorCanvas {
    /// Canvas of the given view size with default settings and fonts
    pub fn new(view_width: u32, view_height: u32) -> Result<Self, CanvasError> {
        Self::with_config(view_width, view_height, CanvasConfig::default())
    }

    pub fn with_config(view_width: u32, view_height: u32, config: CanvasConfig) -> Result<Self, CanvasError> {
        let fonts = FontBook::with_default_fonts()?;
        Self::with_fonts(view_width, view_height, fonts, config)
    }

    pub fn with_fonts(
        view_width: u32,
        view_height: u32,
        fonts: FontBook,
        config: CanvasConfig,
    ) -> Result<Self, CanvasError> {
        let config = config.validated()?;
        info!("🎨 Creating {}x{} editor canvas", view_width, view_height);
        Ok(Self {
            scene: Scene::new(view_width, view_height, fonts, config),
            gestures: GestureMachine::new(),
            highlight: BoundaryHighlight::new(),
            renderer: Renderer::new(),
            input: InputHandler::new(),
            show_border: false,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct access to the scene; events it raises are delivered on the
    /// next canvas call or [`EditorCanvas::flush_events`]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn config(&self) -> &CanvasConfig {
        self.scene.config()
    }

    pub fn set_config(&mut self, config: CanvasConfig) -> Result<(), CanvasError> {
        self.scene.set_config(config.validated()?);
        Ok(())
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        self.scene.fonts_mut()
    }

    pub fn placement(&self) -> Placement {
        self.scene.placement()
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    pub fn highlight(&self) -> &BoundaryHighlight {
        &self.highlight
    }

    // --- events ---

    pub fn events(&self) -> &EventBus {
        self.scene.events()
    }

    pub fn subscribe(&mut self, handler: impl EventHandler + 'static) -> SubscriptionId {
        self.scene.events_mut().subscribe(handler)
    }

    pub fn subscribe_to(&mut self, kinds: &[EventKind], handler: impl EventHandler + 'static) -> SubscriptionId {
        self.scene.events_mut().subscribe_to(kinds, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.scene.events_mut().unsubscribe(id)
    }

    /// Deliver queued scene events to the subscribers
    pub fn flush_events(&mut self) -> usize {
        self.scene.events_mut().flush()
    }

    fn finish<T>(&mut self, result: T) -> T {
        self.scene.events_mut().flush();
        result
    }

    // --- input ---

    /// Feed one raw touch event. Returns whether the canvas needs repainting.
    pub fn handle_touch(&mut self, event: &TouchEvent) -> bool {
        let dirty = self.gestures.handle(event, &mut self.scene, &mut self.highlight);
        self.finish(dirty)
    }

    /// Screen rectangle the canvas is shown in, for egui input conversion
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.input.set_canvas_rect(rect);
    }

    /// Feed this frame's egui input
    pub fn handle_egui(&mut self, ctx: &Context) -> bool {
        let touches = self.input.process_input(ctx);
        self.handle_touches(&touches)
    }

    /// Feed a batch of egui events stamped with `now`
    pub fn handle_egui_events(&mut self, events: &[egui::Event], now: Duration) -> bool {
        let touches = self.input.process_events(events, now);
        self.handle_touches(&touches)
    }

    fn handle_touches(&mut self, touches: &[TouchEvent]) -> bool {
        let mut dirty = false;
        for touch in touches {
            dirty |= self.handle_touch(touch);
        }
        dirty
    }

    // --- timers ---

    /// The next fade step the host should schedule, if any
    pub fn next_timer(&self) -> Option<FadeTick> {
        self.highlight.pending()
    }

    /// Fire a scheduled fade step. Stale ticks are ignored.
    pub fn fire_timer(&mut self, tick: FadeTick) -> bool {
        self.highlight.fire(tick, self.scene.config())
    }

    /// Fire every fade step due at or before `now`
    pub fn advance_timers(&mut self, now: Duration) -> bool {
        let mut changed = false;
        while let Some(tick) = self.highlight.pending() {
            if tick.due > now {
                break;
            }
            changed |= self.fire_timer(tick);
        }
        changed
    }

    // --- rendering ---

    /// Render the editing view with selection chrome
    pub fn preview(&mut self) -> Result<RgbaImage, CanvasError> {
        self.renderer.render_preview(&self.scene, &self.highlight, self.show_border)
    }

    /// [`EditorCanvas::preview`] ready for upload as an egui texture
    pub fn preview_image(&mut self) -> Result<ColorImage, CanvasError> {
        Ok(Renderer::to_color_image(&self.preview()?))
    }

    /// Flatten background, drawings, items and overlay into one raster
    pub fn export(&mut self) -> Result<RgbaImage, CanvasError> {
        self.renderer.render_export(&self.scene)
    }

    pub fn show_border(&self) -> bool {
        self.show_border
    }

    pub fn set_show_border(&mut self, show: bool) {
        self.show_border = show;
    }

    pub fn set_frame(&mut self, frame: Option<RgbaImage>) {
        self.renderer.overlay_mut().set_frame(frame);
    }

    pub fn set_filter(&mut self, filter: Option<ColorMatrix>) {
        self.renderer.overlay_mut().set_filter(filter);
    }

    pub fn set_control_style(&mut self, style: ControlStyle) {
        self.renderer.set_control_style(style);
    }

    // --- items ---

    pub fn items(&self) -> &[OverlayItem] {
        self.scene.items()
    }

    pub fn item(&self, id: ItemId) -> Option<&OverlayItem> {
        self.scene.item(id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut OverlayItem> {
        self.scene.item_mut(id)
    }

    pub fn selected_id(&self) -> Option<ItemId> {
        self.scene.selected_id()
    }

    pub fn add_text(&mut self, text: &str, style: Option<TextStyle>) -> Result<ItemId, CanvasError> {
        let result = self.scene.add_text(text, style);
        self.finish(result)
    }

    pub fn add_sticker(&mut self, bitmap: RgbaImage) -> Result<ItemId, CanvasError> {
        let result = self.scene.add_sticker(bitmap);
        self.finish(result)
    }

    pub fn add_sticker_bytes(&mut self, bytes: &[u8]) -> Result<ItemId, CanvasError> {
        let result = self.scene.add_sticker_bytes(bytes);
        self.finish(result)
    }

    pub fn delete_item(&mut self, id: ItemId) -> Result<(), CanvasError> {
        if self.gestures.state().item() == Some(id) {
            self.gestures.reset();
        }
        let result = self.scene.delete(id);
        self.finish(result)
    }

    pub fn select(&mut self, id: ItemId) -> Result<(), CanvasError> {
        let result = self.scene.select(id);
        self.finish(result)
    }

    pub fn deselect_all(&mut self) {
        self.scene.deselect_all();
        self.flush_events();
    }

    /// Give a text item a new style snapshot (the style's text included)
    pub fn update_text_style(&mut self, id: ItemId, style: TextStyle) -> Result<(), CanvasError> {
        let result = self.scene.update_text_style(id, style);
        self.finish(result)
    }

    // --- background ---

    /// Replace the background, dropping every item and drawing
    pub fn set_background(&mut self, bitmap: Option<RgbaImage>) -> Result<(), CanvasError> {
        self.gestures.reset();
        self.highlight.hide();
        let result = self.scene.set_background(bitmap);
        self.finish(result)
    }

    /// Decode an encoded image and use it as the background
    pub fn set_background_bytes(&mut self, bytes: &[u8]) -> Result<(), CanvasError> {
        let decoded = image::load_from_memory(bytes)?;
        self.set_background(Some(decoded.to_rgba8()))
    }

    /// Install a crop result; it replaces the original used by
    /// [`EditorCanvas::reset_to_original`] and drops every item and drawing
    pub fn apply_crop(&mut self, bitmap: &RgbaImage) -> Result<(), CanvasError> {
        self.gestures.reset();
        self.highlight.hide();
        let result = self.scene.apply_crop(bitmap);
        self.finish(result)
    }

    pub fn reset_to_original(&mut self) -> Result<(), CanvasError> {
        self.gestures.reset();
        self.highlight.hide();
        let result = self.scene.reset_to_original();
        self.finish(result)
    }

    pub fn clear_background(&mut self) {
        self.scene.clear_background();
    }

    pub fn resize_view(&mut self, width: u32, height: u32) {
        self.gestures.reset();
        self.scene.resize_view(width, height);
        self.flush_events();
    }

    // --- drawing ---

    pub fn is_drawing_enabled(&self) -> bool {
        self.scene.drawing().is_enabled()
    }

    /// Switch freehand drawing on or off; erase mode is switched off either way
    pub fn enable_drawing(&mut self, enabled: bool) {
        self.gestures.reset();
        self.scene.drawing_mut().set_enabled(enabled);
        info!("✏️ Drawing {}", if enabled { "enabled" } else { "disabled" });
    }

    /// Pick a brush color, which also turns drawing on
    pub fn set_brush_color(&mut self, color: Color32) {
        self.scene.drawing_mut().set_brush_color(color);
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.scene.drawing_mut().set_brush_size(size);
    }

    pub fn set_erase_mode(&mut self, erase: bool) {
        self.scene.drawing_mut().set_erase_mode(erase);
    }

    pub fn clear_drawings(&mut self) {
        self.scene.clear_drawings();
    }
}
