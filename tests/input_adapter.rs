mod common;

use common::*;
use egui::{Event, Modifiers, PointerButton, Pos2, Rect, TouchDeviceId, TouchId, TouchPhase};
use photo_canvas::input::{InputHandler, MOUSE_POINTER_ID};
use photo_canvas::TouchAction;

fn touch(id: u64, phase: TouchPhase, x: f32, y: f32) -> Event {
    Event::Touch {
        device_id: TouchDeviceId(0),
        id: TouchId(id),
        phase,
        pos: Pos2::new(x, y),
        force: None,
    }
}

fn mouse_button(x: f32, y: f32, pressed: bool) -> Event {
    Event::PointerButton {
        pos: Pos2::new(x, y),
        button: PointerButton::Primary,
        pressed,
        modifiers: Modifiers::NONE,
    }
}

#[test]
fn test_touches_become_multi_pointer_events() {
    init_logger();
    let mut input = InputHandler::new();
    let events = input.process_events(
        &[
            touch(7, TouchPhase::Start, 10.0, 10.0),
            touch(8, TouchPhase::Start, 50.0, 10.0),
            touch(8, TouchPhase::Move, 60.0, 10.0),
            touch(8, TouchPhase::End, 60.0, 10.0),
            touch(7, TouchPhase::End, 10.0, 10.0),
        ],
        ms(5),
    );

    let actions: Vec<_> = events.iter().map(|e| e.action).collect();
    assert_eq!(
        actions,
        vec![
            TouchAction::Down,
            TouchAction::PointerDown,
            TouchAction::Move,
            TouchAction::PointerUp,
            TouchAction::Up,
        ]
    );
    assert_eq!(events[1].pointer_count(), 2);
    assert_eq!(events[1].acting_pointer().unwrap().id, 8);
    assert_eq!(events[2].pointers[1].pos, Pos2::new(60.0, 10.0));
    assert_eq!(events[3].acting_pointer().unwrap().id, 8);
    assert_eq!(events[4].pointer_count(), 1);
    assert!(events.iter().all(|e| e.timestamp == ms(5)));
}

#[test]
fn test_positions_are_relative_to_canvas_rect() {
    let mut input = InputHandler::new();
    input.set_canvas_rect(Rect::from_min_size(Pos2::new(100.0, 50.0), egui::vec2(400.0, 400.0)));
    let events = input.process_events(&[touch(1, TouchPhase::Start, 150.0, 80.0)], ms(0));
    assert_eq!(events[0].primary().unwrap().pos, Pos2::new(50.0, 30.0));
}

#[test]
fn test_mouse_acts_as_single_finger() {
    let mut input = InputHandler::new();
    let events = input.process_events(
        &[
            Event::PointerMoved(Pos2::new(1.0, 1.0)),
            mouse_button(10.0, 10.0, true),
            Event::PointerMoved(Pos2::new(20.0, 20.0)),
            mouse_button(20.0, 20.0, false),
            Event::PointerMoved(Pos2::new(30.0, 30.0)),
        ],
        ms(0),
    );

    let actions: Vec<_> = events.iter().map(|e| e.action).collect();
    assert_eq!(actions, vec![TouchAction::Down, TouchAction::Move, TouchAction::Up]);
    assert!(events.iter().all(|e| e.primary().unwrap().id == MOUSE_POINTER_ID));
}

#[test]
fn test_mouse_ignored_once_touch_seen() {
    let mut input = InputHandler::new();
    input.process_events(
        &[touch(1, TouchPhase::Start, 0.0, 0.0), touch(1, TouchPhase::End, 0.0, 0.0)],
        ms(0),
    );
    let events = input.process_events(&[mouse_button(10.0, 10.0, true)], ms(1));
    assert!(events.is_empty());
}

#[test]
fn test_cancelled_touches_reach_the_canvas() {
    let mut canvas = canvas_with_background(1000);
    canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    canvas.handle_egui_events(&[touch(3, TouchPhase::Start, 500.0, 500.0)], ms(0));
    assert!(matches!(
        canvas.gesture_state(),
        photo_canvas::GestureState::Dragging { .. }
    ));
    canvas.handle_egui_events(&[touch(3, TouchPhase::Cancel, 500.0, 500.0)], ms(10));
    assert_eq!(canvas.gesture_state(), photo_canvas::GestureState::Idle);
}

#[test]
fn test_mouse_drag_moves_sticker() {
    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    canvas.handle_egui_events(
        &[
            mouse_button(500.0, 500.0, true),
            Event::PointerMoved(Pos2::new(520.0, 480.0)),
            mouse_button(520.0, 480.0, false),
        ],
        ms(0),
    );

    assert_eq!(canvas.item(id).unwrap().position(), Pos2::new(370.0, 330.0));
}
