use glam::Vec3;

use super::constraint::{ConstraintKind, JointConstraint, JointLimits};
use crate::math::{safe_normalize, Euler, Frame, Transform};

/// Horizontal projection length below which a forward counts as vertical.
pub const GIMBAL_EPSILON: f32 = 1.0e-4;

/// Left/up chosen by the most recent Euler extraction, in the joint's reference space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastFrame {
    pub left: Vec3,
    pub up: Vec3,
}

impl Default for LastFrame {
    fn default() -> Self {
        Self {
            left: Vec3::Y,
            up: Vec3::Z,
        }
    }
}

/// Static per-joint configuration supplied when a chain is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointConfig {
    pub length: f32,
    pub constraint: JointConstraint,
    pub rest: Euler,
    pub pole: Option<Vec3>,
}

impl JointConfig {
    pub fn new(length: f32) -> Self {
        Self {
            length,
            constraint: JointConstraint::free(),
            rest: Euler::ZERO,
            pole: None,
        }
    }

    pub fn with_constraint(mut self, constraint: JointConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn with_rest(mut self, rest: Euler) -> Self {
        self.rest = rest;
        self
    }

    pub fn with_pole(mut self, pole: Vec3) -> Self {
        self.pole = Some(pole);
        self
    }
}

/// One rigid segment of a chain and the constraint on its rotation relative to its parent.
///
/// Position and frame are world space; `euler` is relative to the parent joint's frame
/// (the chain attachment frame for joint 0). Parent and child are the neighbouring
/// entries of the owning chain's joint list.
#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) index: usize,
    pub(crate) position: Vec3,
    pub(crate) frame: Frame,
    pub(crate) euler: Euler,
    pub(crate) length: f32,
    pub(crate) constraint: JointConstraint,
    pub(crate) pole: Option<Vec3>,
    pub(crate) last_frame: LastFrame,
    pub(crate) at_limit: bool,
    pub(crate) step_forward: bool,
    pub(crate) step_backward: bool,
}

impl Joint {
    pub fn new(length: f32) -> Self {
        Self::from_config(JointConfig::new(length))
    }

    pub fn from_config(config: JointConfig) -> Self {
        let swing = Euler::new(config.rest.yaw, config.rest.pitch, 0.0).to_frame();
        Self {
            index: 0,
            position: Vec3::ZERO,
            frame: config.rest.to_frame(),
            euler: config.rest,
            length: config.length,
            constraint: config.constraint,
            pole: config.pole,
            last_frame: LastFrame {
                left: swing.left,
                up: swing.up,
            },
            at_limit: false,
            step_forward: false,
            step_backward: false,
        }
    }

    pub fn with_constraint(mut self, constraint: JointConstraint) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn forward(&self) -> Vec3 {
        self.frame.forward
    }

    pub fn left(&self) -> Vec3 {
        self.frame.left
    }

    pub fn up(&self) -> Vec3 {
        self.frame.up
    }

    pub fn euler(&self) -> Euler {
        self.euler
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn kind(&self) -> ConstraintKind {
        self.constraint.kind
    }

    pub fn limits(&self) -> &JointLimits {
        &self.constraint.limits
    }

    pub fn constraint(&self) -> &JointConstraint {
        &self.constraint
    }

    pub fn pole(&self) -> Option<Vec3> {
        self.pole
    }

    pub fn set_pole(&mut self, pole: Vec3) {
        self.pole = Some(pole);
    }

    pub fn clear_pole(&mut self) {
        self.pole = None;
    }

    pub fn last_frame(&self) -> &LastFrame {
        &self.last_frame
    }

    /// Whether the last constraint evaluation had to clamp this joint.
    pub fn is_at_limit(&self) -> bool {
        self.at_limit
    }

    /// Single-step debug flags: (next on the forward leg, next on the backward leg).
    pub fn step_flags(&self) -> (bool, bool) {
        (self.step_forward, self.step_backward)
    }

    pub fn compute_end(&self) -> Vec3 {
        self.position + self.frame.forward * self.length
    }

    /// Aims the joint at `target` and slides it so its end lands exactly on `target`.
    pub fn place_toward_target(&mut self, target: Vec3) {
        self.frame = self.frame.aimed(target - self.position);
        self.position = target - self.frame.forward * self.length;
    }

    /// Clamps yaw, pitch and roll independently. Returns whether anything moved.
    pub fn clamp_euler(&mut self) -> bool {
        let clamped = self.constraint.limits.clamp(self.euler);
        self.at_limit = clamped != self.euler;
        self.euler = clamped;
        self.at_limit
    }

    /// Decomposes `forward` (reference space) into yaw and pitch.
    ///
    /// Away from the vertical there are two decompositions; the one whose untwisted
    /// left/up best matches the previous extraction wins, which keeps a limb crossing
    /// over the vertical from flipping 180° between frames. Exactly vertical forwards
    /// take yaw 0 and use roll to stay aligned with the previous left.
    pub fn extract_euler_from_forward(&mut self, forward: Vec3) -> Euler {
        let f = safe_normalize(forward, Vec3::X);
        let h = (f.x * f.x + f.y * f.y).sqrt();

        if h <= GIMBAL_EPSILON {
            let pitch = if f.z > 0.0 {
                -std::f32::consts::FRAC_PI_2
            } else {
                std::f32::consts::FRAC_PI_2
            };
            let base = Euler::new(0.0, pitch, 0.0);
            let chosen = Euler::new(0.0, pitch, base.roll_to_match(self.last_frame.left));
            let frame = chosen.to_frame();
            self.last_frame = LastFrame {
                left: frame.left,
                up: frame.up,
            };
            return chosen;
        }

        let yaw_preferred = Euler::new(f.y.atan2(f.x), (-f.z).atan2(h), 0.0);
        let pitch_preferred = Euler::new((-f.y).atan2(-f.x), (-f.z).atan2(-h), 0.0);

        let a = yaw_preferred.to_frame();
        let b = pitch_preferred.to_frame();
        let score = |frame: &Frame| {
            frame.left.dot(self.last_frame.left) + frame.up.dot(self.last_frame.up)
        };

        let (chosen, frame) = if score(&a) >= score(&b) {
            (yaw_preferred, a)
        } else {
            (pitch_preferred, b)
        };
        self.last_frame = LastFrame {
            left: frame.left,
            up: frame.up,
        };
        chosen
    }

    /// Rotation relative to the parent, offset by the parent's length along its forward.
    pub fn local_transform(&self, parent_length: f32) -> Transform {
        Transform::new(Vec3::X * parent_length, self.euler.to_quat())
    }
}
