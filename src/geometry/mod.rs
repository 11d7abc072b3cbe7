//! Item transforms and hit testing.

mod hit_testing;
mod transform;

pub use hit_testing::{fits_within, hit_body, square_around, topmost_hit};
pub use transform::{ItemTransform, angle_between, map_point, normalize_degrees, wrap_delta};
