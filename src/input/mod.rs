use std::time::Duration;

use egui::{Context, Event, PointerButton, Pos2, Rect, TouchPhase};
use log::debug;

mod gestures;
pub use gestures::{GestureMachine, GestureState};

/// Pointer id used for mouse input converted to touches
pub const MOUSE_POINTER_ID: u64 = u64::MAX;

/// Kind of a raw touch event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// First finger touched down
    Down,
    /// One or more fingers moved
    Move,
    /// Last finger lifted
    Up,
    /// An additional finger touched down
    PointerDown,
    /// A finger lifted while others stay down
    PointerUp,
    /// The system took the touch sequence away
    Cancel,
}

/// One finger of a touch event, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPointer {
    pub id: u64,
    pub pos: Pos2,
}

/// A raw touch event with every finger that is down.
///
/// `action_index` points at the finger the action is about (the one that
/// went down or up); for `Up` and `PointerUp` that finger is still listed.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub action: TouchAction,
    pub pointers: Vec<TouchPointer>,
    pub action_index: usize,
    /// Host clock time of the event
    pub timestamp: Duration,
}

impl TouchEvent {
    pub fn new(action: TouchAction, pointers: Vec<TouchPointer>, action_index: usize, timestamp: Duration) -> Self {
        Self {
            action,
            pointers,
            action_index,
            timestamp,
        }
    }

    /// Single-finger event with pointer id 0
    pub fn single(action: TouchAction, pos: Pos2, timestamp: Duration) -> Self {
        Self::new(action, vec![TouchPointer { id: 0, pos }], 0, timestamp)
    }

    /// The first finger, which drives single-finger gestures
    pub fn primary(&self) -> Option<&TouchPointer> {
        self.pointers.first()
    }

    /// The finger the action is about
    pub fn acting_pointer(&self) -> Option<&TouchPointer> {
        self.pointers.get(self.action_index)
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }
}

/// Converts raw egui input into touch events in canvas coordinates.
///
/// Touch input is used when the platform provides it; mouse presses and drags
/// act as a single finger until the first touch event is seen, after which
/// mouse events are ignored (platforms tend to emulate the mouse from touches).
#[derive(Debug, Default)]
pub struct InputHandler {
    canvas_rect: Option<Rect>,
    touches: Vec<TouchPointer>,
    mouse_down: bool,
    seen_touch: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Screen rectangle the canvas is shown in; positions are made relative
    /// to its top-left corner
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = Some(rect);
    }

    fn to_canvas(&self, pos: Pos2) -> Pos2 {
        match self.canvas_rect {
            Some(rect) => (pos - rect.min).to_pos2(),
            None => pos,
        }
    }

    /// Convert this frame's egui events
    pub fn process_input(&mut self, ctx: &Context) -> Vec<TouchEvent> {
        ctx.input(|input| {
            let now = Duration::from_secs_f64(input.time.max(0.0));
            self.process_events(&input.events, now)
        })
    }

    /// Convert a batch of egui events stamped with `now`
    pub fn process_events(&mut self, events: &[Event], now: Duration) -> Vec<TouchEvent> {
        let mut out = Vec::new();
        for event in events {
            match event {
                Event::Touch { id, phase, pos, .. } => {
                    self.seen_touch = true;
                    if let Some(touch) = self.on_touch(id.0, *phase, self.to_canvas(*pos), now) {
                        out.push(touch);
                    }
                }
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } if !self.seen_touch => {
                    let pos = self.to_canvas(*pos);
                    if *pressed && !self.mouse_down {
                        self.mouse_down = true;
                        out.push(mouse_event(TouchAction::Down, pos, now));
                    } else if !*pressed && self.mouse_down {
                        self.mouse_down = false;
                        out.push(mouse_event(TouchAction::Up, pos, now));
                    }
                }
                Event::PointerMoved(pos) if !self.seen_touch && self.mouse_down => {
                    out.push(mouse_event(TouchAction::Move, self.to_canvas(*pos), now));
                }
                Event::PointerGone if !self.seen_touch && self.mouse_down => {
                    self.mouse_down = false;
                    out.push(TouchEvent::new(TouchAction::Cancel, Vec::new(), 0, now));
                }
                _ => {}
            }
        }
        out
    }

    fn on_touch(&mut self, id: u64, phase: TouchPhase, pos: Pos2, now: Duration) -> Option<TouchEvent> {
        match phase {
            TouchPhase::Start => {
                self.touches.retain(|t| t.id != id);
                self.touches.push(TouchPointer { id, pos });
                let action = if self.touches.len() == 1 {
                    TouchAction::Down
                } else {
                    TouchAction::PointerDown
                };
                Some(TouchEvent::new(action, self.touches.clone(), self.touches.len() - 1, now))
            }
            TouchPhase::Move => {
                let index = self.touches.iter().position(|t| t.id == id)?;
                self.touches[index].pos = pos;
                Some(TouchEvent::new(TouchAction::Move, self.touches.clone(), index, now))
            }
            TouchPhase::End => {
                let index = self.touches.iter().position(|t| t.id == id)?;
                self.touches[index].pos = pos;
                let action = if self.touches.len() == 1 {
                    TouchAction::Up
                } else {
                    TouchAction::PointerUp
                };
                let event = TouchEvent::new(action, self.touches.clone(), index, now);
                self.touches.remove(index);
                Some(event)
            }
            TouchPhase::Cancel => {
                debug!("Touch sequence cancelled with {} fingers down", self.touches.len());
                let pointers = std::mem::take(&mut self.touches);
                Some(TouchEvent::new(TouchAction::Cancel, pointers, 0, now))
            }
        }
    }
}

fn mouse_event(action: TouchAction, pos: Pos2, now: Duration) -> TouchEvent {
    TouchEvent::new(action, vec![TouchPointer { id: MOUSE_POINTER_ID, pos }], 0, now)
}
