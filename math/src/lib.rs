//! Small maths helpers shared by the gameplay and automap crates: a wrapped
//! `Angle` and the deterministic table-driven `Random` source.

mod angle;
mod random;

pub use angle::*;
pub use random::*;

use glam::Vec2;

/// Rotate `point` around `origin` by `angle`.
#[inline]
pub fn rotate_around(point: Vec2, origin: Vec2, angle: Angle) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    let d = point - origin;
    origin + Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos)
}

/// Returns -1.0, 0.0 or 1.0. Unlike `f32::signum` zero stays zero.
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}
