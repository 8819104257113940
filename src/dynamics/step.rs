use glam::Vec3;
use std::f32::consts::PI;

use crate::math::safe_normalize;

/// Timing and lift of one staged step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepShape {
    /// Seconds from lift-off to touch-down.
    pub duration: f32,
    /// Peak lift along the up axis, reached halfway.
    pub height: f32,
}

impl Default for StepShape {
    fn default() -> Self {
        Self {
            duration: 0.25,
            height: 0.3,
        }
    }
}

impl StepShape {
    pub fn new(duration: f32, height: f32) -> Self {
        Self { duration, height }
    }
}

pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Eased arc from `from` to `to`, lifted by a half sine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepCurve {
    from: Vec3,
    to: Vec3,
    lift: Vec3,
    duration: f32,
    elapsed: f32,
}

impl StepCurve {
    pub fn new(from: Vec3, to: Vec3, shape: StepShape, up: Vec3) -> Self {
        Self {
            from,
            to,
            lift: safe_normalize(up, Vec3::Z) * shape.height,
            duration: shape.duration.max(0.0),
            elapsed: 0.0,
        }
    }

    pub fn from(&self) -> Vec3 {
        self.from
    }

    pub fn to(&self) -> Vec3 {
        self.to
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        if t >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, smoothstep(t)) + self.lift * (PI * t).sin()
    }

    pub fn current(&self) -> Vec3 {
        self.sample(self.progress())
    }

    pub fn advance(&mut self, dt: f32) -> Vec3 {
        if dt > 0.0 {
            self.elapsed += dt;
        }
        self.current()
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}
