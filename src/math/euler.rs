use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use super::Frame;

/// Yaw/pitch/roll in radians, composed as `Rz(yaw) · Ry(pitch) · Rx(roll)` in Z-up space.
/// Positive pitch tips the forward below the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Euler {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Euler {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn from_degrees(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self::new(yaw.to_radians(), pitch.to_radians(), roll.to_radians())
    }

    /// Yaw-preferred decomposition of a frame: pitch stays within ±90°.
    pub fn from_frame(frame: &Frame) -> Self {
        let f = frame.forward;
        let h = (f.x * f.x + f.y * f.y).sqrt();
        let yaw = if h > 1.0e-6 { f.y.atan2(f.x) } else { 0.0 };
        let pitch = (-f.z).atan2(h);
        let base = Self::new(yaw, pitch, 0.0);
        Self::new(yaw, pitch, base.roll_to_match(frame.left))
    }

    pub fn to_quat(&self) -> Quat {
        self.swing() * Quat::from_rotation_x(self.roll)
    }

    pub fn to_frame(&self) -> Frame {
        Frame::from_quat(self.to_quat())
    }

    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        Vec3::new(cy * cp, sy * cp, -sp)
    }

    /// Roll that carries this swing's untwisted left as close as possible to `left`.
    pub fn roll_to_match(&self, left: Vec3) -> f32 {
        let swing = self.swing();
        let x = left.dot(swing * Vec3::Y);
        let y = left.dot(swing * Vec3::Z);
        if x * x + y * y < 1.0e-10 {
            0.0
        } else {
            y.atan2(x)
        }
    }

    /// The other (yaw, pitch) pair describing the same forward: yaw folded by 180° and
    /// pitch mirrored through the vertical.
    pub fn folded(&self) -> Self {
        Self::new(
            wrap_angle(self.yaw + PI),
            wrap_angle(PI - self.pitch),
            wrap_angle(self.roll + PI),
        )
    }

    pub fn is_near_gimbal(&self) -> bool {
        (self.pitch.abs() - FRAC_PI_2).abs() < 1.0e-4
    }

    fn swing(&self) -> Quat {
        Quat::from_rotation_z(self.yaw) * Quat::from_rotation_y(self.pitch)
    }
}

/// Wraps an angle into (-π, π].
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle.rem_euclid(TAU);
    if a > PI {
        a -= TAU;
    }
    a
}
