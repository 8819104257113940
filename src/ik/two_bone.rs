//! Analytic two-segment bend: law of cosines at the root, law of sines at the goal.

use glam::{Quat, Vec3};
use std::f32::consts::PI;

use crate::math::{orthogonal_part, safe_normalize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoBonePose {
    /// Unit direction of the upper segment.
    pub upper: Vec3,
    /// Unit direction of the lower segment.
    pub lower: Vec3,
    pub elbow: Vec3,
}

/// Picks the axis the bend rotates about, as a unit vector perpendicular to `direction`.
///
/// Order of preference: the plane through the pole, the current bend plane
/// (`lower × upper`), then each fallback axis in turn.
pub fn bend_axis(
    direction: Vec3,
    pole: Option<Vec3>,
    upper_forward: Vec3,
    lower_forward: Vec3,
    fallbacks: &[Vec3],
) -> Vec3 {
    let from_pole = pole.map(|p| direction.cross(p));
    let from_bend = lower_forward.cross(upper_forward);

    from_pole
        .into_iter()
        .chain(std::iter::once(from_bend))
        .chain(fallbacks.iter().copied())
        .filter(|axis| axis.length_squared() > 1.0e-8)
        .find_map(|axis| orthogonal_part(axis, direction))
        .unwrap_or_else(|| direction.any_orthonormal_vector())
}

/// Bends `upper` and `lower` so the lower end lands on `goal`, or as close as the lengths
/// allow. Rotating toward `+axis` decides which side the elbow goes.
pub fn solve(origin: Vec3, goal: Vec3, upper: f32, lower: f32, axis: Vec3) -> Option<TwoBonePose> {
    if upper <= 0.0 || lower <= 0.0 {
        return None;
    }

    let to_goal = goal - origin;
    let distance = to_goal.length();
    if distance < 1.0e-6 {
        return None;
    }
    let direction = to_goal / distance;

    let axis = safe_normalize(axis, Vec3::ZERO);
    if axis == Vec3::ZERO {
        return None;
    }

    let max_reach = upper + lower;
    let min_reach = ((upper - lower).abs() + 1.0e-5).min(max_reach);
    let reach = distance.clamp(min_reach, max_reach);

    let cos_root = ((upper * upper + reach * reach - lower * lower) / (2.0 * upper * reach))
        .clamp(-1.0, 1.0);
    let root_angle = cos_root.acos();

    let mut goal_angle = (upper * root_angle.sin() / lower).clamp(-1.0, 1.0).asin();
    if lower * lower + reach * reach < upper * upper {
        goal_angle = PI - goal_angle;
    }

    let upper_dir = Quat::from_axis_angle(axis, root_angle) * direction;
    let lower_dir = Quat::from_axis_angle(axis, -goal_angle) * direction;

    Some(TwoBonePose {
        upper: upper_dir,
        lower: lower_dir,
        elbow: origin + upper_dir * upper,
    })
}
