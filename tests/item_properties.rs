mod common;

use common::*;
use egui::Pos2;
use photo_canvas::geometry::topmost_hit;
use photo_canvas::{CanvasConfig, ItemTransform};

#[test]
fn test_at_most_one_item_selected() {
    let mut canvas = canvas_with_background(1000);
    let a = canvas.add_sticker(sticker(300, 300, [255, 0, 0, 255])).unwrap();
    let b = canvas.add_text("Second", None).unwrap();
    let c = canvas.add_sticker(sticker(100, 200, [0, 0, 255, 255])).unwrap();

    let selected_count = |canvas: &photo_canvas::EditorCanvas| canvas.items().iter().filter(|i| i.is_selected()).count();

    assert_eq!(selected_count(&canvas), 1);
    assert_eq!(canvas.selected_id(), Some(c));

    canvas.select(a).unwrap();
    assert_eq!(selected_count(&canvas), 1);
    assert_eq!(canvas.selected_id(), Some(a));

    canvas.select(b).unwrap();
    assert_eq!(selected_count(&canvas), 1);

    canvas.deselect_all();
    assert_eq!(selected_count(&canvas), 0);

    // A touch on the sticker in the middle selects it and nothing else
    tap(&mut canvas, Pos2::new(500.0, 500.0), 0);
    assert_eq!(selected_count(&canvas), 1);
}

#[test]
fn test_transform_round_trip() {
    let pivot = Pos2::new(123.0, 456.0);
    let points = [
        Pos2::new(0.0, 0.0),
        Pos2::new(123.0, 456.0),
        Pos2::new(-40.0, 900.0),
        Pos2::new(1000.0, 3.5),
    ];
    for rotation in (0..360).step_by(15) {
        for scale in [0.05, 0.3, 1.0, 2.5, 5.0] {
            let transform = ItemTransform::new(pivot, rotation as f32, scale);
            for point in points {
                let back = transform.invert(transform.apply(point));
                let tolerance = 1e-2 * (1.0 + point.distance(pivot) / 100.0);
                assert!(
                    back.distance(point) < tolerance,
                    "r={rotation} s={scale}: {point:?} came back as {back:?}"
                );
            }
        }
    }
}

#[test]
fn test_rotation_is_normalized() {
    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(100, 100, [0, 0, 0, 255])).unwrap();
    let item = canvas.item_mut(id).unwrap();

    for (input, expected) in [(-90.0, 270.0), (720.0, 0.0), (365.0, 5.0), (359.5, 359.5), (-720.0, 0.0)] {
        item.set_rotation(input);
        assert_close(item.rotation(), expected);
        assert!((0.0..360.0).contains(&item.rotation()));
    }
}

#[test]
fn test_later_item_wins_hit_test() {
    let mut canvas = canvas_with_background(1000);
    let first = canvas.add_sticker(sticker(300, 300, [255, 0, 0, 255])).unwrap();
    let second = canvas.add_sticker(sticker(300, 300, [0, 255, 0, 255])).unwrap();

    let scene = canvas.scene();
    let padding = scene.config().body_padding;
    let hit = topmost_hit(scene.items(), Pos2::new(500.0, 500.0), scene.fonts(), padding).unwrap();
    assert_eq!(hit.id(), second);

    // Even with the earlier one selected, a body touch picks the top item
    canvas.select(first).unwrap();
    canvas.handle_touch(&down(500.0, 500.0, 0));
    assert_eq!(canvas.selected_id(), Some(second));
}

#[test]
fn test_scale_clamp_is_idempotent() {
    let config = CanvasConfig::default();
    for scale in [0.0, 0.01, 0.05, 0.7, 1.0, 5.0, 9.0, -3.0] {
        let once = config.clamp_scale(scale);
        assert_eq!(config.clamp_scale(once), once);
        assert!((config.min_scale..=config.max_scale).contains(&once));
    }

    let mut canvas = canvas_with_background(1000);
    let id = canvas.add_sticker(sticker(100, 100, [0, 0, 0, 255])).unwrap();
    let item = canvas.item_mut(id).unwrap();
    item.set_scale(0.0, &config);
    assert_close(item.scale(), 0.05);
    item.set_scale(50.0, &config);
    assert_close(item.scale(), 5.0);
}
