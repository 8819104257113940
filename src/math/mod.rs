//! Math utilities module
//!
//! Orientation frames, Euler angles and rigid transforms on top of glam, plus the
//! degenerate-safe helpers the solvers rely on.

mod euler;
mod frame;
mod transform;

pub use euler::{wrap_angle, Euler};
pub use frame::Frame;
pub use transform::Transform;

// Re-export commonly used glam types
pub use glam::{Mat3, Mat4, Quat, Vec3};

/// Squared length below which a vector is treated as zero.
pub const DEGENERATE_EPSILON: f32 = 1.0e-8;

/// Normalizes `v`, substituting `fallback` when `v` is too short to carry a direction.
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > DEGENERATE_EPSILON && len_sq.is_finite() {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Component of `v` orthogonal to the unit vector `axis`, normalized, or `None`.
pub fn orthogonal_part(v: Vec3, axis: Vec3) -> Option<Vec3> {
    let ortho = v - axis * v.dot(axis);
    let len_sq = ortho.length_squared();
    (len_sq > 1.0e-8).then(|| ortho / len_sq.sqrt())
}

/// Signed angle rotating `from` onto `to` about `normal`, both projected into the
/// plane perpendicular to `normal`.
pub fn signed_angle(from: Vec3, to: Vec3, normal: Vec3) -> f32 {
    normal.dot(from.cross(to)).atan2(from.dot(to))
}

/// Rotates `v` about `axis` (need not be normalized) by `angle` radians.
pub fn rotate_about(v: Vec3, axis: Vec3, angle: f32) -> Vec3 {
    let axis = safe_normalize(axis, Vec3::ZERO);
    if axis == Vec3::ZERO {
        return v;
    }
    Quat::from_axis_angle(axis, angle) * v
}
