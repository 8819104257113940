//! Cyclic coordinate descent.
//!
//! Runs a fixed number of root-to-tip passes; each joint swings so the vector toward the end
//! effector lines up with the vector toward the goal, then goes through its constraint drag.
//! The best pose seen during the solve is what the chain is left in.

use glam::{Quat, Vec3};

use super::chain::Chain;
use super::drag::{drag, Topology};
use super::joint::Joint;
use super::solver::SolveResult;
use crate::math::Euler;

/// Distance gain per pass below which a pass counts as stalled.
const STALL_EPSILON: f32 = 1.0e-4;

pub struct CcdSolver;

impl CcdSolver {
    pub fn solve(chain: &mut Chain) -> SolveResult {
        if chain.joints.is_empty() {
            return SolveResult::settled(chain, 0);
        }

        let goal = chain.target.position();
        chain.rebuild_from_angles(0);

        let mut best = Best::capture(chain);
        let mut previous = best.distance;
        let mut unbent = false;

        for pass in 0..chain.ccd_iterations {
            for i in 0..chain.joints.len() {
                Self::rotate_joint(chain, i, goal);
            }

            let mut distance = chain.distance_to_target();
            best.offer(chain, distance);

            let stalled = previous - distance < STALL_EPSILON;
            if stalled && !unbent && chain.joints.iter().any(Joint::is_at_limit) {
                Self::unbend(chain);
                unbent = true;
                distance = chain.distance_to_target();
                best.offer(chain, distance);
                log::debug!(
                    "chain '{}' unbent after pass {}, distance {:.4}",
                    chain.name,
                    pass,
                    distance
                );
            }

            log::trace!("chain '{}' ccd pass {} distance {:.5}", chain.name, pass, distance);
            previous = distance;
        }

        if best.distance < chain.distance_to_target() {
            chain.joints = best.joints;
        }
        SolveResult::settled(chain, chain.ccd_iterations)
    }

    fn rotate_joint(chain: &mut Chain, i: usize, goal: Vec3) {
        let origin = chain.joints[i].position;
        let to_end = chain.end_effector() - origin;
        let to_goal = goal - origin;
        if to_end.length_squared() < 1.0e-12 || to_goal.length_squared() < 1.0e-12 {
            return;
        }

        let angle = to_end.angle_between(to_goal);
        if angle < 1.0e-6 {
            return;
        }
        let axis = to_end.cross(to_goal);
        let axis = if axis.length_squared() > 1.0e-10 {
            axis.normalize()
        } else {
            chain.joints[i].frame.up
        };

        let swung = chain.joints[i].frame.rotated(Quat::from_axis_angle(axis, angle));
        let mut ctx = chain.drag_context(i, origin + swung.forward, None);
        ctx.twist = swung.left;

        let count = chain.joints.len();
        let joint = &mut chain.joints[i];
        drag(joint, &ctx, Topology::of(i, count));
        chain.rebuild_from_angles(i);
    }

    /// Zeroes every joint's local angles, the whole chain at once.
    fn unbend(chain: &mut Chain) {
        for joint in &mut chain.joints {
            joint.euler = Euler::ZERO;
            joint.at_limit = false;
        }
        chain.rebuild_from_angles(0);
    }
}

struct Best {
    joints: Vec<Joint>,
    distance: f32,
}

impl Best {
    fn capture(chain: &Chain) -> Self {
        Self {
            joints: chain.joints.clone(),
            distance: chain.distance_to_target(),
        }
    }

    fn offer(&mut self, chain: &Chain, distance: f32) {
        if distance < self.distance {
            self.joints.clone_from(&chain.joints);
            self.distance = distance;
        }
    }
}
