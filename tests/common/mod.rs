#![allow(dead_code)]

use std::time::Duration;

use egui::Pos2;
use image::{Rgba, RgbaImage};
use photo_canvas::{EditorCanvas, EventRecorder, TouchAction, TouchEvent, TouchPointer};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Canvas of `side`x`side` showing an opaque gray background of the same size
pub fn canvas_with_background(side: u32) -> EditorCanvas {
    init_logger();
    let mut canvas = EditorCanvas::new(side, side).unwrap();
    canvas
        .set_background(Some(RgbaImage::from_pixel(side, side, Rgba([128, 128, 128, 255]))))
        .unwrap();
    canvas
}

pub fn recorder(canvas: &mut EditorCanvas) -> EventRecorder {
    let recorder = EventRecorder::new();
    canvas.subscribe(recorder.clone());
    recorder
}

pub fn sticker(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

pub fn down(x: f32, y: f32, at: u64) -> TouchEvent {
    TouchEvent::single(TouchAction::Down, Pos2::new(x, y), ms(at))
}

pub fn move_to(x: f32, y: f32, at: u64) -> TouchEvent {
    TouchEvent::single(TouchAction::Move, Pos2::new(x, y), ms(at))
}

pub fn up(x: f32, y: f32, at: u64) -> TouchEvent {
    TouchEvent::single(TouchAction::Up, Pos2::new(x, y), ms(at))
}

/// Two-finger event; finger ids are 0 and 1
pub fn two_fingers(action: TouchAction, a: Pos2, b: Pos2, action_index: usize, at: u64) -> TouchEvent {
    TouchEvent::new(
        action,
        vec![TouchPointer { id: 0, pos: a }, TouchPointer { id: 1, pos: b }],
        action_index,
        ms(at),
    )
}

pub fn tap(canvas: &mut EditorCanvas, point: Pos2, at: u64) {
    canvas.handle_touch(&down(point.x, point.y, at));
    canvas.handle_touch(&up(point.x, point.y, at + 10));
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-3,
        "expected {expected}, got {actual}"
    );
}
