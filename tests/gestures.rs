mod common;

use common::*;
use egui::{Color32, Pos2};
use photo_canvas::gizmo::{ControlButton, control_anchor};
use photo_canvas::{CanvasConfig, CanvasEvent, EditorCanvas, GestureState, TouchAction, TouchEvent};

fn set_unit_scale(canvas: &mut EditorCanvas, id: photo_canvas::ItemId) {
    let config = canvas.config().clone();
    canvas.item_mut(id).unwrap().set_scale(1.0, &config);
}

fn button_center(canvas: &EditorCanvas, id: photo_canvas::ItemId, button: ControlButton) -> Pos2 {
    control_anchor(canvas.item(id).unwrap(), button, canvas.scene().fonts())
}

#[test]
fn test_add_and_drag_sticker() {
    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(300, 300, [200, 10, 10, 255])).unwrap();

    let item = canvas.item(id).unwrap();
    assert_close(item.scale(), 0.5);
    assert_eq!(item.position(), Pos2::new(350.0, 350.0));
    assert!(item.is_selected());

    assert!(canvas.handle_touch(&down(500.0, 500.0, 0)));
    assert!(matches!(canvas.gesture_state(), GestureState::Dragging { .. }));
    canvas.handle_touch(&move_to(650.0, 650.0, 16));
    canvas.handle_touch(&up(650.0, 650.0, 32));

    let item = canvas.item(id).unwrap();
    assert_eq!(item.position(), Pos2::new(500.0, 500.0));
    assert_close(item.scale(), 0.5);
    assert_eq!(canvas.gesture_state(), GestureState::Idle);
    assert!(!canvas.highlight().is_visible());
}

#[test]
fn test_double_tap_requests_text_edit() {
    let mut canvas = canvas_with_background(1000);
    let events = recorder(&mut canvas);
    let id = canvas.add_text("Double tap to edit", None).unwrap();
    let center = canvas.item(id).unwrap().screen_bounds(canvas.scene().fonts()).center();
    let position = canvas.item(id).unwrap().position();

    canvas.handle_touch(&down(center.x, center.y, 0));
    canvas.handle_touch(&up(center.x, center.y, 50));
    canvas.handle_touch(&down(center.x, center.y, 150));
    assert_eq!(canvas.gesture_state(), GestureState::Idle);

    // The second touch must not start a drag
    canvas.handle_touch(&move_to(center.x + 80.0, center.y + 80.0, 170));
    canvas.handle_touch(&up(center.x + 80.0, center.y + 80.0, 190));

    assert_eq!(
        events.count(|e| matches!(e, CanvasEvent::TextEditRequested(target) if *target == id)),
        1
    );
    let item = canvas.item(id).unwrap();
    assert_eq!(item.position(), position);
    assert_eq!(item.double_tap_count(), 1);
}

#[test]
fn test_slow_taps_do_not_request_edit() {
    let mut canvas = canvas_with_background(1000);
    let events = recorder(&mut canvas);
    let id = canvas.add_text("Double tap to edit", None).unwrap();
    let center = canvas.item(id).unwrap().screen_bounds(canvas.scene().fonts()).center();

    tap(&mut canvas, center, 0);
    tap(&mut canvas, center, 400);

    assert_eq!(events.count(|e| matches!(e, CanvasEvent::TextEditRequested(_))), 0);
}

#[test]
fn test_double_tap_on_sticker_is_a_plain_tap() {
    let mut canvas = canvas_with_background(1000);
    let events = recorder(&mut canvas);
    canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    tap(&mut canvas, Pos2::new(500.0, 500.0), 0);
    tap(&mut canvas, Pos2::new(500.0, 500.0), 100);

    assert_eq!(events.count(|e| matches!(e, CanvasEvent::TextEditRequested(_))), 0);
}

#[test]
fn test_delete_button_removes_item() {
    let mut canvas = canvas_with_background(1000);
    let background_only = canvas.export().unwrap();

    let id = canvas.add_sticker(sticker(100, 100, [0, 0, 0, 255])).unwrap();
    set_unit_scale(&mut canvas, id);
    canvas.item_mut(id).unwrap().set_position(Pos2::new(100.0, 100.0));
    assert!(canvas.export().unwrap() != background_only);
    let events = recorder(&mut canvas);

    let delete = button_center(&canvas, id, ControlButton::Delete);
    assert_eq!(delete, Pos2::new(200.0, 100.0));
    canvas.handle_touch(&down(delete.x, delete.y, 0));
    canvas.handle_touch(&up(delete.x, delete.y, 20));

    assert!(canvas.items().is_empty());
    assert_eq!(canvas.selected_id(), None);
    assert_eq!(
        events.events(),
        vec![CanvasEvent::ItemDeleted(id), CanvasEvent::SelectionChanged(None)]
    );
    assert!(canvas.export().unwrap() == background_only);
}

#[test]
fn test_rotate_button_spins_item() {
    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();
    set_unit_scale(&mut canvas, id);

    let rotate = button_center(&canvas, id, ControlButton::Rotate);
    assert_eq!(rotate, Pos2::new(350.0, 650.0));
    canvas.handle_touch(&down(rotate.x, rotate.y, 0));
    assert!(matches!(canvas.gesture_state(), GestureState::Rotating { .. }));

    // From 135 degrees to 45 degrees around (500, 500)
    canvas.handle_touch(&move_to(650.0, 650.0, 16));
    canvas.handle_touch(&up(650.0, 650.0, 32));

    let item = canvas.item(id).unwrap();
    assert_close(item.rotation(), 270.0);
    assert_eq!(item.position(), Pos2::new(350.0, 350.0));
}

#[test]
fn test_pinch_scales_and_rotates() {
    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    let a = Pos2::new(450.0, 500.0);
    let b = Pos2::new(550.0, 500.0);
    canvas.handle_touch(&down(a.x, a.y, 0));
    canvas.handle_touch(&two_fingers(TouchAction::PointerDown, a, b, 1, 10));
    assert!(matches!(canvas.gesture_state(), GestureState::PinchZooming { .. }));

    canvas.handle_touch(&two_fingers(
        TouchAction::Move,
        Pos2::new(400.0, 500.0),
        Pos2::new(600.0, 500.0),
        0,
        20,
    ));
    assert_close(canvas.item(id).unwrap().scale(), 1.0);
    assert_close(canvas.item(id).unwrap().rotation(), 0.0);

    canvas.handle_touch(&two_fingers(
        TouchAction::Move,
        Pos2::new(500.0, 400.0),
        Pos2::new(500.0, 600.0),
        0,
        30,
    ));
    assert_close(canvas.item(id).unwrap().scale(), 1.0);
    assert_close(canvas.item(id).unwrap().rotation(), 90.0);

    // Lifting the second finger keeps the gesture alive
    canvas.handle_touch(&two_fingers(
        TouchAction::PointerUp,
        Pos2::new(500.0, 400.0),
        Pos2::new(500.0, 600.0),
        1,
        40,
    ));
    assert!(matches!(canvas.gesture_state(), GestureState::PinchZooming { .. }));
    canvas.handle_touch(&up(500.0, 400.0, 50));
    assert_eq!(canvas.gesture_state(), GestureState::Idle);
}

#[test]
fn test_pinch_without_rotation_when_disabled() {
    init_logger();
    let config = CanvasConfig {
        pinch_rotates: false,
        ..CanvasConfig::default()
    };
    let mut canvas = EditorCanvas::with_config(1000, 1000, config).unwrap();
    canvas
        .set_background(Some(sticker(1000, 1000, [128, 128, 128, 255])))
        .unwrap();
    let id = canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    let a = Pos2::new(450.0, 500.0);
    let b = Pos2::new(550.0, 500.0);
    canvas.handle_touch(&down(a.x, a.y, 0));
    canvas.handle_touch(&two_fingers(TouchAction::PointerDown, a, b, 1, 10));
    canvas.handle_touch(&two_fingers(
        TouchAction::Move,
        Pos2::new(500.0, 450.0),
        Pos2::new(500.0, 550.0),
        0,
        20,
    ));

    let item = canvas.item(id).unwrap();
    assert_close(item.rotation(), 0.0);
    assert_close(item.scale(), 0.5);
}

#[test]
fn test_pinch_scale_is_clamped() {
    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    let a = Pos2::new(480.0, 500.0);
    let b = Pos2::new(520.0, 500.0);
    canvas.handle_touch(&down(a.x, a.y, 0));
    canvas.handle_touch(&two_fingers(TouchAction::PointerDown, a, b, 1, 10));
    canvas.handle_touch(&two_fingers(
        TouchAction::Move,
        Pos2::new(100.0, 500.0),
        Pos2::new(900.0, 500.0),
        0,
        20,
    ));

    assert_close(canvas.item(id).unwrap().scale(), 5.0);
}

#[test]
fn test_touch_outside_background_deselects() {
    init_logger();
    let mut canvas = EditorCanvas::new(1000, 1000).unwrap();
    canvas
        .set_background(Some(sticker(1000, 500, [128, 128, 128, 255])))
        .unwrap();
    assert_eq!(canvas.placement().top, 250.0);
    canvas.add_sticker(sticker(100, 100, [0, 0, 0, 255])).unwrap();
    let events = recorder(&mut canvas);

    canvas.handle_touch(&down(500.0, 100.0, 0));

    assert_eq!(canvas.selected_id(), None);
    assert_eq!(events.events(), vec![CanvasEvent::SelectionChanged(None)]);
}

#[test]
fn test_touch_on_empty_area_deselects() {
    let mut canvas = canvas_with_background(1000);
    canvas.add_sticker(sticker(100, 100, [0, 0, 0, 255])).unwrap();

    tap(&mut canvas, Pos2::new(50.0, 950.0), 0);

    assert_eq!(canvas.selected_id(), None);
}

#[test]
fn test_dragging_off_background_triggers_highlight() {
    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    canvas.handle_touch(&down(500.0, 500.0, 0));
    canvas.handle_touch(&move_to(950.0, 500.0, 100));

    // Positions are never clamped
    assert_eq!(canvas.item(id).unwrap().position(), Pos2::new(800.0, 350.0));
    assert!(canvas.highlight().is_visible());
    assert_eq!(canvas.highlight().alpha(), 180);

    let tick = canvas.next_timer().unwrap();
    assert_eq!(tick.due, ms(600));
    assert!(!canvas.advance_timers(ms(599)));
    assert!(canvas.advance_timers(ms(600)));
    assert_eq!(canvas.highlight().alpha(), 175);

    canvas.advance_timers(ms(10_000));
    assert!(!canvas.highlight().is_visible());
    assert_eq!(canvas.next_timer(), None);
}

#[test]
fn test_new_violation_supersedes_fade() {
    let mut canvas = canvas_with_background(1000);
    canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    canvas.handle_touch(&down(500.0, 500.0, 0));
    canvas.handle_touch(&move_to(950.0, 500.0, 100));
    let stale = canvas.next_timer().unwrap();
    canvas.handle_touch(&move_to(960.0, 500.0, 200));

    assert!(!canvas.fire_timer(stale));
    assert_eq!(canvas.highlight().alpha(), 180);
    assert_eq!(canvas.next_timer().unwrap().due, ms(700));
}

#[test]
fn test_cancel_returns_to_idle() {
    let mut canvas = canvas_with_background(1000);
    canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();

    canvas.handle_touch(&down(500.0, 500.0, 0));
    assert!(matches!(canvas.gesture_state(), GestureState::Dragging { .. }));
    canvas.handle_touch(&TouchEvent::new(TouchAction::Cancel, Vec::new(), 0, ms(10)));
    assert_eq!(canvas.gesture_state(), GestureState::Idle);
}

#[test]
fn test_freehand_brush_and_eraser() {
    let mut canvas = canvas_with_background(400);
    canvas.set_brush_color(Color32::RED);
    assert!(canvas.is_drawing_enabled());

    canvas.handle_touch(&down(100.0, 100.0, 0));
    canvas.handle_touch(&move_to(200.0, 100.0, 10));
    assert_eq!(canvas.gesture_state(), GestureState::FreehandDrawing);

    // Not committed yet, so only the preview shows the path
    let preview = canvas.preview().unwrap();
    let export = canvas.export().unwrap();
    assert_eq!(preview.get_pixel(150, 100).0, [255, 0, 0, 255]);
    assert_eq!(export.get_pixel(150, 100).0, [128, 128, 128, 255]);

    canvas.handle_touch(&up(200.0, 100.0, 20));
    let export = canvas.export().unwrap();
    assert_eq!(export.get_pixel(150, 100).0, [255, 0, 0, 255]);

    canvas.set_erase_mode(true);
    canvas.handle_touch(&down(100.0, 100.0, 30));
    canvas.handle_touch(&move_to(200.0, 100.0, 40));
    // Eraser segments apply right away
    let export = canvas.export().unwrap();
    assert_eq!(export.get_pixel(150, 100).0, [128, 128, 128, 255]);
    canvas.handle_touch(&up(200.0, 100.0, 50));
}

#[test]
fn test_drawing_mode_ignores_items() {
    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(300, 300, [0, 0, 0, 255])).unwrap();
    canvas.enable_drawing(true);

    canvas.handle_touch(&down(500.0, 500.0, 0));
    canvas.handle_touch(&move_to(600.0, 600.0, 10));
    canvas.handle_touch(&up(600.0, 600.0, 20));

    assert_eq!(canvas.item(id).unwrap().position(), Pos2::new(350.0, 350.0));
}
