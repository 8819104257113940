//! Joint constraint model: five closed constraint kinds plus per-axis angular ranges.

use std::f32::consts::PI;

use crate::math::Euler;

/// The rotational freedom a joint has relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// No angular limit; only the segment length is kept.
    DistanceOnly = 0,
    /// One degree of freedom about the parent's up axis (yaw range).
    Hinge = 1,
    /// One degree of freedom about the parent's left axis (pitch range).
    KneeHinge = 2,
    /// Cone of half-angle `yaw.max` plus a roll range.
    BallSocket = 3,
    /// Independent yaw, pitch and roll ranges.
    FullEuler = 4,
}

impl ConstraintKind {
    pub const COUNT: usize = 5;

    pub const ALL: [ConstraintKind; Self::COUNT] = [
        ConstraintKind::DistanceOnly,
        ConstraintKind::Hinge,
        ConstraintKind::KneeHinge,
        ConstraintKind::BallSocket,
        ConstraintKind::FullEuler,
    ];
}

/// Closed interval of radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
}

impl Default for AngleRange {
    fn default() -> Self {
        Self::FREE
    }
}

impl AngleRange {
    pub const FREE: Self = Self { min: -PI, max: PI };
    pub const LOCKED: Self = Self { min: 0.0, max: 0.0 };

    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn degrees(min: f32, max: f32) -> Self {
        Self::new(min.to_radians(), max.to_radians())
    }

    pub fn symmetric_degrees(half: f32) -> Self {
        Self::degrees(-half.abs(), half.abs())
    }

    pub fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.min, self.max)
    }

    pub fn contains(&self, angle: f32, tolerance: f32) -> bool {
        angle >= self.min - tolerance && angle <= self.max + tolerance
    }

    pub fn is_free(&self) -> bool {
        self.min <= -PI && self.max >= PI
    }

    /// Largest deflection the range allows in either direction.
    pub fn magnitude(&self) -> f32 {
        self.min.abs().max(self.max.abs())
    }

    /// True when `angle` sits on a finite bound of the range.
    pub fn touches(&self, angle: f32) -> bool {
        !self.is_free() && ((angle - self.min).abs() < 1.0e-4 || (angle - self.max).abs() < 1.0e-4)
    }
}

/// Yaw/pitch/roll ranges, expressed relative to the parent's frame (or the chain
/// attachment frame for the first joint).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct JointLimits {
    pub yaw: AngleRange,
    pub pitch: AngleRange,
    pub roll: AngleRange,
}

impl JointLimits {
    pub const FREE: Self = Self {
        yaw: AngleRange::FREE,
        pitch: AngleRange::FREE,
        roll: AngleRange::FREE,
    };

    pub fn new(yaw: AngleRange, pitch: AngleRange, roll: AngleRange) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn clamp(&self, euler: Euler) -> Euler {
        Euler::new(
            self.yaw.clamp(euler.yaw),
            self.pitch.clamp(euler.pitch),
            self.roll.clamp(euler.roll),
        )
    }

    pub fn contains(&self, euler: Euler, tolerance: f32) -> bool {
        self.yaw.contains(euler.yaw, tolerance)
            && self.pitch.contains(euler.pitch, tolerance)
            && self.roll.contains(euler.roll, tolerance)
    }
}

/// A constraint kind together with the ranges it reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointConstraint {
    pub kind: ConstraintKind,
    pub limits: JointLimits,
}

impl Default for JointConstraint {
    fn default() -> Self {
        Self::free()
    }
}

impl JointConstraint {
    pub fn new(kind: ConstraintKind, limits: JointLimits) -> Self {
        Self { kind, limits }
    }

    pub fn free() -> Self {
        Self::new(ConstraintKind::DistanceOnly, JointLimits::FREE)
    }

    /// Swings about the parent's up axis between `min_deg` and `max_deg`.
    pub fn hinge(min_deg: f32, max_deg: f32) -> Self {
        Self::new(
            ConstraintKind::Hinge,
            JointLimits::new(
                AngleRange::degrees(min_deg, max_deg),
                AngleRange::LOCKED,
                AngleRange::LOCKED,
            ),
        )
    }

    /// Bends about the parent's left axis between `min_deg` and `max_deg` of pitch.
    ///
    /// Yaw and roll stay free. A first joint bends in the plane of the target's left, so
    /// it carries whatever yaw and roll that plane has relative to the attachment; later
    /// knees always keep both at zero.
    pub fn knee(min_deg: f32, max_deg: f32) -> Self {
        Self::new(
            ConstraintKind::KneeHinge,
            JointLimits::new(
                AngleRange::FREE,
                AngleRange::degrees(min_deg, max_deg),
                AngleRange::FREE,
            ),
        )
    }

    pub fn ball_socket(cone_deg: f32, roll_min_deg: f32, roll_max_deg: f32) -> Self {
        let cone = AngleRange::symmetric_degrees(cone_deg);
        Self::new(
            ConstraintKind::BallSocket,
            JointLimits::new(cone, cone, AngleRange::degrees(roll_min_deg, roll_max_deg)),
        )
    }

    pub fn euler(yaw: AngleRange, pitch: AngleRange, roll: AngleRange) -> Self {
        Self::new(ConstraintKind::FullEuler, JointLimits::new(yaw, pitch, roll))
    }
}
