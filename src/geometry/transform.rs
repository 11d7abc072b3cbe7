use egui::{Pos2, Rect};

/// Rotation and uniform scale of an overlay item about its own pivot.
///
/// The forward mapping takes a point from the item's local (unrotated,
/// unscaled) space to screen space: first rotate by `rotation` degrees about
/// `pivot`, then scale by `scale` about the same pivot. Positive angles turn
/// clockwise on screen because y points down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemTransform {
    /// Center of the item's local bounding box
    pub pivot: Pos2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Uniform scale factor, always > 0
    pub scale: f32,
}

impl ItemTransform {
    pub fn new(pivot: Pos2, rotation: f32, scale: f32) -> Self {
        Self { pivot, rotation, scale }
    }

    /// Transform for an item with the given local bounds
    pub fn for_bounds(bounds: Rect, rotation: f32, scale: f32) -> Self {
        Self::new(bounds.center(), rotation, scale)
    }

    pub fn is_identity(&self) -> bool {
        self.rotation == 0.0 && self.scale == 1.0
    }

    /// Forward matrix: rotate about the pivot, then scale about the pivot
    pub fn to_matrix(&self) -> [[f32; 3]; 3] {
        let to_origin = translation(-self.pivot.x, -self.pivot.y);
        let back = translation(self.pivot.x, self.pivot.y);
        let scale = [
            [self.scale, 0.0, 0.0],
            [0.0, self.scale, 0.0],
            [0.0, 0.0, 1.0],
        ];

        let local = if self.rotation == 0.0 {
            scale
        } else {
            multiply_matrices(&scale, &rotation(self.rotation))
        };

        multiply_matrices(&back, &multiply_matrices(&local, &to_origin))
    }

    /// Inverse of [`Self::to_matrix`], built directly from the parameters
    pub fn inverse_matrix(&self) -> [[f32; 3]; 3] {
        let to_origin = translation(-self.pivot.x, -self.pivot.y);
        let back = translation(self.pivot.x, self.pivot.y);
        let inv = 1.0 / self.scale;
        let unscale = [[inv, 0.0, 0.0], [0.0, inv, 0.0], [0.0, 0.0, 1.0]];

        let local = if self.rotation == 0.0 {
            unscale
        } else {
            multiply_matrices(&rotation(-self.rotation), &unscale)
        };

        multiply_matrices(&back, &multiply_matrices(&local, &to_origin))
    }

    /// Map a local-space point to screen space
    pub fn apply(&self, local: Pos2) -> Pos2 {
        let dx = local.x - self.pivot.x;
        let dy = local.y - self.pivot.y;
        if self.rotation == 0.0 {
            return Pos2::new(self.pivot.x + dx * self.scale, self.pivot.y + dy * self.scale);
        }
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Pos2::new(
            self.pivot.x + (dx * cos - dy * sin) * self.scale,
            self.pivot.y + (dx * sin + dy * cos) * self.scale,
        )
    }

    /// Map a screen-space point back into local space
    pub fn invert(&self, screen: Pos2) -> Pos2 {
        let dx = (screen.x - self.pivot.x) / self.scale;
        let dy = (screen.y - self.pivot.y) / self.scale;
        if self.rotation == 0.0 {
            return Pos2::new(self.pivot.x + dx, self.pivot.y + dy);
        }
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Pos2::new(
            self.pivot.x + dx * cos + dy * sin,
            self.pivot.y - dx * sin + dy * cos,
        )
    }

    /// Screen positions of the four corners of a local rectangle,
    /// clockwise from the top-left
    pub fn corners(&self, local: Rect) -> [Pos2; 4] {
        [
            self.apply(local.left_top()),
            self.apply(local.right_top()),
            self.apply(local.right_bottom()),
            self.apply(local.left_bottom()),
        ]
    }

    /// Axis-aligned screen bounds of a transformed local rectangle
    pub fn bounding_rect(&self, local: Rect) -> Rect {
        let mut rect = Rect::NOTHING;
        for corner in self.corners(local) {
            rect.extend_with(corner);
        }
        rect
    }
}

/// Apply a 3x3 affine matrix to a point
pub fn map_point(matrix: &[[f32; 3]; 3], p: Pos2) -> Pos2 {
    Pos2::new(
        matrix[0][0] * p.x + matrix[0][1] * p.y + matrix[0][2],
        matrix[1][0] * p.x + matrix[1][1] * p.y + matrix[1][2],
    )
}

/// Normalize an angle in degrees into `[0, 360)`
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wrap an angle difference into `(-180, 180]`
pub fn wrap_delta(delta: f32) -> f32 {
    let wrapped = normalize_degrees(delta);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Angle of `point` as seen from `center`, in degrees within `[0, 360)`
pub fn angle_between(center: Pos2, point: Pos2) -> f32 {
    let angle = (point.y - center.y).atan2(point.x - center.x).to_degrees();
    normalize_degrees(angle)
}

fn translation(x: f32, y: f32) -> [[f32; 3]; 3] {
    [[1.0, 0.0, x], [0.0, 1.0, y], [0.0, 0.0, 1.0]]
}

fn rotation(degrees: f32) -> [[f32; 3]; 3] {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [[cos, -sin, 0.0], [sin, cos, 0.0], [0.0, 0.0, 1.0]]
}

const fn const_multiply_matrices(a: &[[f32; 3]; 3], b: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    let mut result = [[0.0; 3]; 3];
    let mut i = 0;
    while i < 3 {
        let mut j = 0;
        while j < 3 {
            let mut k = 0;
            while k < 3 {
                result[i][j] += a[i][k] * b[k][j];
                k += 1;
            }
            j += 1;
        }
        i += 1;
    }
    result
}

fn multiply_matrices(a: &[[f32; 3]; 3], b: &[[f32; 3]; 3]) -> [[f32; 3]; 3] {
    const_multiply_matrices(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Pos2, b: Pos2) -> bool {
        (a.x - b.x).abs() < 1e-2 && (a.y - b.y).abs() < 1e-2
    }

    #[test]
    fn test_quarter_turn_is_clockwise_on_screen() {
        let t = ItemTransform::new(Pos2::new(0.0, 0.0), 90.0, 1.0);
        assert!(close(t.apply(Pos2::new(10.0, 0.0)), Pos2::new(0.0, 10.0)));
    }

    #[test]
    fn test_matrix_agrees_with_direct_mapping() {
        let t = ItemTransform::new(Pos2::new(40.0, -12.0), 33.0, 2.5);
        let p = Pos2::new(7.0, 19.0);
        assert!(close(map_point(&t.to_matrix(), p), t.apply(p)));
        assert!(close(map_point(&t.inverse_matrix(), t.apply(p)), p));
    }

    #[test]
    fn test_zero_rotation_scales_about_pivot() {
        let t = ItemTransform::new(Pos2::new(100.0, 100.0), 0.0, 0.5);
        assert_eq!(t.apply(Pos2::new(200.0, 100.0)), Pos2::new(150.0, 100.0));
        assert_eq!(t.invert(Pos2::new(150.0, 100.0)), Pos2::new(200.0, 100.0));
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(725.0), 5.0);
        let tiny = normalize_degrees(-1e-7);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_wrap_delta() {
        assert_eq!(wrap_delta(350.0), -10.0);
        assert_eq!(wrap_delta(-350.0), 10.0);
        assert_eq!(wrap_delta(180.0), 180.0);
    }

    #[test]
    fn test_angle_between() {
        let c = Pos2::new(0.0, 0.0);
        assert_eq!(angle_between(c, Pos2::new(1.0, 0.0)), 0.0);
        assert!((angle_between(c, Pos2::new(0.0, 1.0)) - 90.0).abs() < 1e-4);
        assert!((angle_between(c, Pos2::new(0.0, -1.0)) - 270.0).abs() < 1e-4);
    }
}
