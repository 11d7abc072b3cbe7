//! Touch gesture state machine for overlay items.
//!
//! Raw touch events come in, scene mutations and notifications come out.
//!
//! # State Transitions
//!
//! ```text
//!                 delete button / miss / double tap
//!               ┌──────────────────────────┐
//!               │                          │
//!          ┌────▼─────┐  item body   ┌─────┴──────┐
//!          │          ├──────────────►  Dragging  │
//!          │          │              └─────┬──────┘
//!          │          │  rotate button     │ second finger
//!          │   Idle   ├─────────────┐      │
//!          │          │        ┌────▼──────▼────┐
//!          │          │        │ Rotating /     │
//!          │          ◄────────┤ PinchZooming   │
//!          └────┬─────┘  up    └────────────────┘
//!               │ drawing enabled
//!          ┌────▼────────────┐
//!          │ FreehandDrawing │
//!          └─────────────────┘
//! ```
//!
//! Up, cancel or lifting the primary pointer always returns to `Idle`.

use std::time::Duration;

use egui::{Pos2, Vec2};
use log::{debug, info};

use super::{TouchAction, TouchEvent};
use crate::element::ItemId;
use crate::event::CanvasEvent;
use crate::geometry::{angle_between, fits_within, topmost_hit, wrap_delta};
use crate::gizmo::{ControlButton, hit_control};
use crate::highlight::BoundaryHighlight;
use crate::scene::Scene;

/// What the current touch sequence is doing
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress
    #[default]
    Idle,
    /// One finger moves an item; `offset` is touch minus item anchor
    Dragging { item: ItemId, offset: Vec2 },
    /// The rotate button is held; angles are in degrees about `center`
    Rotating {
        item: ItemId,
        center: Pos2,
        last_angle: f32,
    },
    /// Two fingers scale (and optionally turn) the selected item
    PinchZooming {
        item: ItemId,
        last_distance: f32,
        last_angle: f32,
    },
    /// A freehand path is being drawn
    FreehandDrawing,
}

impl GestureState {
    /// Item the gesture acts on, if any
    pub fn item(&self) -> Option<ItemId> {
        match self {
            GestureState::Dragging { item, .. }
            | GestureState::Rotating { item, .. }
            | GestureState::PinchZooming { item, .. } => Some(*item),
            GestureState::Idle | GestureState::FreehandDrawing => None,
        }
    }
}

/// Turns touch sequences into drags, rotations, pinches, button presses,
/// double-tap edit requests and freehand strokes
#[derive(Debug, Clone, Default)]
pub struct GestureMachine {
    state: GestureState,
    last_tap: Option<(ItemId, Duration)>,
    primary_pointer: Option<u64>,
}

impl GestureMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Abandon the current gesture
    pub fn reset(&mut self) {
        if self.state != GestureState::Idle {
            debug!("Gesture {:?} -> Idle", self.state);
        }
        self.state = GestureState::Idle;
        self.primary_pointer = None;
    }

    /// Feed one touch event. Returns whether the canvas needs repainting.
    pub fn handle(&mut self, event: &TouchEvent, scene: &mut Scene, highlight: &mut BoundaryHighlight) -> bool {
        if event.action == TouchAction::Cancel {
            scene.drawing_mut().cancel();
            self.reset();
            return true;
        }

        let Some(primary) = event.primary() else {
            return false;
        };
        let point = primary.pos;
        let inside = scene.placement().contains(point);

        if scene.drawing().is_enabled() {
            return self.handle_drawing(event.action, point, inside, scene);
        }

        match event.action {
            TouchAction::Down => {
                self.primary_pointer = Some(primary.id);
                if !inside {
                    debug!("Touch outside the background at {:?}", point);
                    self.state = GestureState::Idle;
                    scene.deselect_all();
                    return true;
                }
                self.on_down(point, event.timestamp, scene)
            }
            TouchAction::PointerDown => inside && self.on_pointer_down(event, scene),
            TouchAction::Move => inside && self.on_move(event, point, scene, highlight),
            TouchAction::Up | TouchAction::Cancel => {
                self.reset();
                true
            }
            TouchAction::PointerUp => {
                let lifted = event.acting_pointer().map(|p| p.id);
                if lifted.is_some() && lifted == self.primary_pointer {
                    self.reset();
                }
                true
            }
        }
    }

    fn on_down(&mut self, point: Pos2, now: Duration, scene: &mut Scene) -> bool {
        if let Some(selected) = scene.selected() {
            let id = selected.id();
            match hit_control(selected, point, scene.fonts(), scene.config()) {
                Some(ControlButton::Delete) => {
                    info!("❌ Delete button pressed on item {}", id);
                    self.state = GestureState::Idle;
                    return scene.delete(id).is_ok();
                }
                Some(ControlButton::Rotate) => {
                    let center = selected.local_bounds(scene.fonts()).center();
                    self.state = GestureState::Rotating {
                        item: id,
                        center,
                        last_angle: angle_between(center, point),
                    };
                    debug!("Rotating item {} about {:?}", id, center);
                    return true;
                }
                None => {}
            }
        }

        let hit = topmost_hit(scene.items(), point, scene.fonts(), scene.config().body_padding)
            .map(|item| (item.id(), item.is_text() && item.is_selected(), item.position()));

        let Some((id, selected_text, anchor)) = hit else {
            scene.deselect_all();
            self.state = GestureState::Idle;
            return true;
        };

        if selected_text && self.is_double_tap(id, now, scene) {
            if let Some(item) = scene.item_mut(id) {
                item.record_double_tap();
            }
            info!("✍️ Double tap on text item {}, requesting edit", id);
            scene.notify(CanvasEvent::TextEditRequested(id));
            self.last_tap = None;
            self.state = GestureState::Idle;
            return true;
        }

        self.last_tap = Some((id, now));
        if scene.select(id).is_err() {
            return false;
        }
        self.state = GestureState::Dragging {
            item: id,
            offset: point - anchor,
        };
        true
    }

    fn is_double_tap(&self, id: ItemId, now: Duration, scene: &Scene) -> bool {
        let window = Duration::from_millis(scene.config().double_tap_ms);
        match self.last_tap {
            Some((last_id, last_time)) => last_id == id && now.saturating_sub(last_time) < window,
            None => false,
        }
    }

    fn on_pointer_down(&mut self, event: &TouchEvent, scene: &mut Scene) -> bool {
        if event.pointers.len() != 2 {
            return false;
        }
        let Some(id) = scene.selected_id() else {
            return false;
        };

        let (a, b) = (event.pointers[0].pos, event.pointers[1].pos);
        let distance = a.distance(b);
        if distance > scene.config().min_pinch_distance {
            self.state = GestureState::PinchZooming {
                item: id,
                last_distance: distance,
                last_angle: angle_between(a, b),
            };
            debug!("Pinch started on item {} (distance {:.1})", id, distance);
        }
        true
    }

    fn on_move(&mut self, event: &TouchEvent, point: Pos2, scene: &mut Scene, highlight: &mut BoundaryHighlight) -> bool {
        match self.state {
            GestureState::Rotating { item, center, last_angle } => {
                let angle = angle_between(center, point);
                let Some(target) = scene.item_mut(item) else {
                    self.reset();
                    return false;
                };
                target.set_rotation(target.rotation() + angle - last_angle);
                self.state = GestureState::Rotating {
                    item,
                    center,
                    last_angle: angle,
                };
                true
            }
            GestureState::PinchZooming {
                item,
                last_distance,
                last_angle,
            } => {
                if event.pointers.len() < 2 {
                    return false;
                }
                let (a, b) = (event.pointers[0].pos, event.pointers[1].pos);
                let distance = a.distance(b);
                if distance <= scene.config().min_pinch_distance {
                    return false;
                }
                let angle = angle_between(a, b);

                let config = scene.config().clone();
                let Some(target) = scene.item_mut(item) else {
                    self.reset();
                    return false;
                };
                target.set_scale(target.scale() * distance / last_distance, &config);
                if config.pinch_rotates {
                    target.set_rotation(target.rotation() + wrap_delta(angle - last_angle));
                }
                self.state = GestureState::PinchZooming {
                    item,
                    last_distance: distance,
                    last_angle: angle,
                };
                true
            }
            GestureState::Dragging { item, offset } => {
                if scene.move_item_to(item, point - offset).is_err() {
                    self.reset();
                    return false;
                }
                check_bounds(item, event.timestamp, scene, highlight);
                true
            }
            GestureState::Idle | GestureState::FreehandDrawing => false,
        }
    }

    fn handle_drawing(&mut self, action: TouchAction, point: Pos2, inside: bool, scene: &mut Scene) -> bool {
        let drawing = scene.drawing_mut();
        match action {
            TouchAction::Down => {
                if !inside {
                    return false;
                }
                drawing.begin(point);
                self.state = GestureState::FreehandDrawing;
                true
            }
            TouchAction::Move => {
                if !inside || self.state != GestureState::FreehandDrawing {
                    return false;
                }
                drawing.extend(point);
                true
            }
            TouchAction::Up => {
                if self.state == GestureState::FreehandDrawing {
                    drawing.commit();
                }
                self.state = GestureState::Idle;
                true
            }
            TouchAction::PointerDown | TouchAction::PointerUp | TouchAction::Cancel => false,
        }
    }
}

/// Restart the boundary highlight when a dragged item leaves the background
fn check_bounds(id: ItemId, now: Duration, scene: &Scene, highlight: &mut BoundaryHighlight) {
    let Some(item) = scene.item(id) else {
        return;
    };
    let bounds = item.screen_bounds(scene.fonts());
    let config = scene.config();
    if !fits_within(bounds, scene.placement().rect(), config.boundary_margin) {
        highlight.trigger(now, config);
    }
}
