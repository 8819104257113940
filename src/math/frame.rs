use glam::{Mat3, Quat, Vec3};

use super::{orthogonal_part, safe_normalize};

/// Orthonormal forward/left/up triad. `forward × left = up`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub forward: Vec3,
    pub left: Vec3,
    pub up: Vec3,
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Frame {
    pub const IDENTITY: Self = Self {
        forward: Vec3::X,
        left: Vec3::Y,
        up: Vec3::Z,
    };

    pub fn from_quat(rotation: Quat) -> Self {
        Self {
            forward: rotation * Vec3::X,
            left: rotation * Vec3::Y,
            up: rotation * Vec3::Z,
        }
    }

    /// Builds a frame whose forward is exactly `forward` and whose left is as close to
    /// `left_hint` as the forward allows. Falls back to world left, then to any
    /// perpendicular axis, when the hint is colinear with the forward.
    pub fn from_forward(forward: Vec3, left_hint: Vec3) -> Self {
        let forward = safe_normalize(forward, Vec3::X);
        let left = orthogonal_part(left_hint, forward)
            .or_else(|| orthogonal_part(Vec3::Y, forward))
            .unwrap_or_else(|| forward.any_orthonormal_vector());
        Self {
            forward,
            left,
            up: forward.cross(left),
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_mat3(&Mat3::from_cols(self.forward, self.left, self.up)).normalize()
    }

    /// Re-derives left and up from the forward and the current left via cross products.
    pub fn orthonormalized(&self) -> Self {
        Self::from_forward(self.forward, self.left)
    }

    pub fn rotated(&self, rotation: Quat) -> Self {
        Self {
            forward: rotation * self.forward,
            left: rotation * self.left,
            up: rotation * self.up,
        }
    }

    /// Turns the frame by the shortest arc that carries its forward onto `forward`,
    /// keeping twist about the forward as undisturbed as possible.
    pub fn aimed(&self, forward: Vec3) -> Self {
        let forward = safe_normalize(forward, self.forward);
        Self::from_forward(forward, Quat::from_rotation_arc(self.forward, forward) * self.left)
    }

    pub fn to_local(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.forward), v.dot(self.left), v.dot(self.up))
    }

    pub fn to_world(&self, v: Vec3) -> Vec3 {
        self.forward * v.x + self.left * v.y + self.up * v.z
    }

    /// Expresses `other` (world space) in this frame's coordinates.
    pub fn to_local_frame(&self, other: &Frame) -> Frame {
        Frame {
            forward: self.to_local(other.forward),
            left: self.to_local(other.left),
            up: self.to_local(other.up),
        }
    }

    /// Inverse of [`Frame::to_local_frame`].
    pub fn to_world_frame(&self, local: &Frame) -> Frame {
        Frame {
            forward: self.to_world(local.forward),
            left: self.to_world(local.left),
            up: self.to_world(local.up),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.forward.is_finite() && self.left.is_finite() && self.up.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec(actual: Vec3, expected: Vec3) {
        assert!(
            (actual - expected).length() < 1e-5,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn from_forward_survives_colinear_hint() {
        let frame = Frame::from_forward(Vec3::Y, Vec3::Y);
        assert_vec(frame.forward, Vec3::Y);
        assert!(frame.left.dot(frame.forward).abs() < 1e-6);
        assert_vec(frame.forward.cross(frame.left), frame.up);
    }

    #[test]
    fn quat_round_trip_preserves_axes() {
        let rotation = Quat::from_rotation_z(0.7) * Quat::from_rotation_y(-0.3);
        let frame = Frame::from_quat(rotation);
        let back = Frame::from_quat(frame.rotation());
        assert_vec(back.forward, frame.forward);
        assert_vec(back.left, frame.left);
        assert_vec(back.up, frame.up);
    }

    #[test]
    fn local_world_frames_are_inverse() {
        let parent = Frame::from_quat(Quat::from_rotation_x(0.4) * Quat::from_rotation_z(1.1));
        let child = Frame::from_quat(Quat::from_rotation_y(0.9));
        let back = parent.to_world_frame(&parent.to_local_frame(&child));
        assert_vec(back.forward, child.forward);
        assert_vec(back.left, child.left);
    }
}
