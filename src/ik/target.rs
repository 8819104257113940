use glam::Vec3;

use crate::dynamics::{StepCurve, StepShape};
use crate::math::Frame;

/// Where a chain's end effector should be.
///
/// `position` is what the solvers chase this frame. `goal` is where a staged step will
/// land; while a step is in flight the two differ and [`Target::advance`] moves
/// `position` along the step curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    position: Vec3,
    goal: Vec3,
    frame: Frame,
    step: Option<StepCurve>,
    shape: StepShape,
    lift_axis: Vec3,
}

impl Target {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            goal: position,
            frame: Frame::IDENTITY,
            step: None,
            shape: StepShape::default(),
            lift_axis: Vec3::Z,
        }
    }

    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn goal(&self) -> Vec3 {
        self.goal
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn set_frame(&mut self, frame: Frame) {
        self.frame = frame;
    }

    /// Teleports the target; any staged step is dropped.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.goal = position;
        self.step = None;
    }

    /// Starts a staged step from the current position to `goal`.
    pub fn begin_step(&mut self, goal: Vec3, shape: StepShape, up: Vec3) {
        self.shape = shape;
        self.lift_axis = up;
        self.goal = goal;
        self.step = Some(StepCurve::new(self.position, goal, shape, up));
    }

    /// Overwrites the goal. A step in flight restarts from wherever the target is now,
    /// which is the only way to cancel or redirect one.
    pub fn set_goal(&mut self, goal: Vec3) {
        self.begin_step(goal, self.shape, self.lift_axis);
    }

    pub fn is_stepping(&self) -> bool {
        self.goal != self.position
    }

    pub fn step(&self) -> Option<&StepCurve> {
        self.step.as_ref()
    }

    /// Moves `position` along the staged step. Returns true once the target rests on its goal.
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.step.as_mut() {
            Some(curve) => {
                self.position = curve.advance(dt);
                if curve.is_finished() {
                    self.position = self.goal;
                    self.step = None;
                }
            }
            None => self.position = self.goal,
        }
        !self.is_stepping()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_step_lands_on_goal() {
        let mut target = Target::new(Vec3::ZERO);
        target.begin_step(Vec3::new(1.0, 0.0, 0.0), StepShape::new(0.2, 0.1), Vec3::Z);
        assert!(target.is_stepping());
        assert_eq!(target.position(), Vec3::ZERO);

        assert!(!target.advance(0.1));
        assert!(target.position().z > 0.0);
        assert!(target.advance(0.15));
        assert_eq!(target.position(), Vec3::new(1.0, 0.0, 0.0));
        assert!(!target.is_stepping());
    }

    #[test]
    fn overwriting_goal_redirects_from_current_position() {
        let mut target = Target::new(Vec3::ZERO);
        target.begin_step(Vec3::X, StepShape::new(1.0, 0.0), Vec3::Z);
        target.advance(0.5);
        let midway = target.position();
        target.set_goal(-Vec3::X);
        assert_eq!(target.step().map(|s| s.from()), Some(midway));
        target.advance(2.0);
        assert_eq!(target.position(), -Vec3::X);
    }

    #[test]
    fn set_position_cancels_step() {
        let mut target = Target::new(Vec3::ZERO);
        target.begin_step(Vec3::X, StepShape::default(), Vec3::Z);
        target.set_position(Vec3::Y);
        assert!(!target.is_stepping());
        assert!(target.step().is_none());
    }
}
