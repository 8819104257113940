//! FABRIK with constraint-aware drags.
//!
//! One iteration is a backward pass (tip to root: each joint aims at the point its end must
//! reach and slides onto it) followed by a forward pass (root to tip: each joint is
//! re-pinned to its parent's end and re-aimed). Every joint update goes through
//! [`drag`](super::drag::drag), so constraints are honoured in both directions.

use glam::Vec3;

use super::chain::{Chain, RootMode};
use super::drag::{drag, ChildReach, Topology};
use super::two_bone;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveResult {
    pub converged: bool,
    pub iterations: u32,
    pub final_distance: f32,
}

impl SolveResult {
    pub(crate) fn settled(chain: &Chain, iterations: u32) -> Self {
        let final_distance = chain.distance_to_target();
        Self {
            converged: final_distance <= chain.tolerance,
            iterations,
            final_distance,
        }
    }

    fn empty() -> Self {
        Self {
            converged: true,
            iterations: 0,
            final_distance: 0.0,
        }
    }
}

pub struct FabrikSolver;

impl FabrikSolver {
    pub fn solve(chain: &mut Chain) -> SolveResult {
        if chain.joints.is_empty() {
            return SolveResult::empty();
        }

        let goal = chain.target.position();
        if chain.single_step {
            return Self::step_once(chain, goal);
        }

        match chain.root_mode {
            RootMode::Anchored => Self::solve_anchored(chain, goal),
            RootMode::Dragged => Self::solve_dragged(chain, goal),
        }
    }

    /// Out-of-reach goals go through the same passes; each pass leaves every segment at
    /// its own length, so the chain simply ends up pointing at the goal.
    fn solve_anchored(chain: &mut Chain, goal: Vec3) -> SolveResult {
        if (2..=3).contains(&chain.joints.len()) {
            Self::seed_two_bone(chain, goal);
        }
        Self::forward_pass(chain, goal);

        let tolerance = chain.tolerance;
        let max_iterations = chain.max_iterations;

        for iteration in 0..max_iterations {
            let distance = chain.distance_to_target();
            if distance <= tolerance {
                return SolveResult {
                    converged: true,
                    iterations: iteration,
                    final_distance: distance,
                };
            }

            Self::backward_pass(chain, goal);
            Self::forward_pass(chain, goal);
            log::trace!(
                "chain '{}' iteration {} distance {:.5}",
                chain.name,
                iteration,
                chain.distance_to_target()
            );
        }

        SolveResult::settled(chain, max_iterations)
    }

    /// The backward pass lands the end on the goal and the root goes wherever the drag
    /// leaves it. A forward pass from the new root then re-applies every constraint
    /// against the final parent frames.
    fn solve_dragged(chain: &mut Chain, goal: Vec3) -> SolveResult {
        let max_iterations = chain.max_iterations.max(1);
        for iteration in 1..=max_iterations {
            Self::backward_pass(chain, goal);
            Self::follow_root(chain);
            Self::forward_pass(chain, goal);
            if chain.distance_to_target() <= chain.tolerance {
                return SolveResult::settled(chain, iteration);
            }
        }
        SolveResult::settled(chain, max_iterations)
    }

    fn follow_root(chain: &mut Chain) {
        chain.attach.position = chain.joints[0].position;
    }

    fn backward_pass(chain: &mut Chain, goal: Vec3) {
        for i in (0..chain.joints.len()).rev() {
            Self::backward_step(chain, i, goal);
        }
    }

    fn forward_pass(chain: &mut Chain, goal: Vec3) {
        for i in 0..chain.joints.len() {
            let pull = Self::forward_pull(chain, i, goal);
            Self::forward_step(chain, i, pull, goal);
        }
    }

    /// Aims joint `i` at the point its end must reach, then slides it back along its
    /// new forward so the end sits exactly on that point.
    fn backward_step(chain: &mut Chain, i: usize, goal: Vec3) {
        let count = chain.joints.len();
        let pull = chain.joints.get(i + 1).map_or(goal, |next| next.position);
        let child = Self::child_reach(chain, i, goal);
        let ctx = chain.drag_context(i, pull, child);

        let joint = &mut chain.joints[i];
        let frame = drag(joint, &ctx, Topology::of(i, count));
        joint.frame = frame;
        joint.position = pull - frame.forward * joint.length;
    }

    /// Pins joint `i` to its parent's end (the attachment for the root) and aims it at `pull`.
    fn forward_step(chain: &mut Chain, i: usize, pull: Vec3, goal: Vec3) {
        let count = chain.joints.len();
        chain.joints[i].position = match i {
            0 => chain.attach.position,
            _ => chain.joints[i - 1].compute_end(),
        };
        let child = Self::child_reach(chain, i, goal);
        let ctx = chain.drag_context(i, pull, child);

        let joint = &mut chain.joints[i];
        joint.frame = drag(joint, &ctx, Topology::of(i, count));
    }

    fn forward_pull(chain: &Chain, i: usize, goal: Vec3) -> Vec3 {
        chain.joints.get(i + 1).map_or(goal, |next| next.position)
    }

    /// The segment the root bends around: joint 1 reaching for joint 2 (or the goal).
    fn child_reach(chain: &Chain, i: usize, goal: Vec3) -> Option<ChildReach> {
        if i != 0 {
            return None;
        }
        let child = chain.joints.get(1)?;
        Some(ChildReach {
            length: child.length,
            reach: chain.joints.get(2).map_or(goal, |j| j.position),
            forward: child.frame.forward,
        })
    }

    /// Analytic bend for short chains. Three joints are treated as an upper bone and a
    /// straight lower bone made of the last two.
    fn seed_two_bone(chain: &mut Chain, goal: Vec3) {
        let origin = chain.attach.position;
        let upper = chain.joints[0].length;
        let lower: f32 = chain.joints[1..].iter().map(|j| j.length).sum();

        let direction = goal - origin;
        if direction.length_squared() < 1.0e-12 {
            return;
        }
        let pole = chain.joints.iter().find_map(|j| j.pole).map(|p| p - origin);
        let axis = two_bone::bend_axis(
            direction.normalize(),
            pole,
            chain.joints[0].frame.forward,
            chain.joints[1].frame.forward,
            &[chain.root_frame.left, chain.root_frame.up],
        );
        let Some(pose) = two_bone::solve(origin, goal, upper, lower, axis) else {
            return;
        };

        chain.joints[0].position = origin;
        chain.joints[0].frame = chain.joints[0].frame.aimed(pose.upper);
        let mut cursor = pose.elbow;
        for joint in &mut chain.joints[1..] {
            joint.position = cursor;
            joint.frame = joint.frame.aimed(pose.lower);
            cursor = joint.compute_end();
        }
    }

    /// Advances the single-step cursor by one joint update.
    ///
    /// The cursor lives in the joints' step flags: the backward leg walks tip to root, the
    /// forward leg walks root to tip, and the cycle then wraps to the tip again.
    fn step_once(chain: &mut Chain, goal: Vec3) -> SolveResult {
        let count = chain.joints.len();
        let cursor = chain
            .joints
            .iter()
            .position(|j| j.step_backward || j.step_forward);

        let (index, backward) = match cursor {
            Some(i) => (i, chain.joints[i].step_backward),
            None => (count - 1, true),
        };
        chain.joints[index].step_backward = false;
        chain.joints[index].step_forward = false;

        if backward {
            Self::backward_step(chain, index, goal);
            match index {
                0 => {
                    if chain.root_mode == RootMode::Dragged {
                        Self::follow_root(chain);
                    }
                    chain.joints[0].step_forward = true;
                }
                i => chain.joints[i - 1].step_backward = true,
            }
        } else {
            let pull = Self::forward_pull(chain, index, goal);
            Self::forward_step(chain, index, pull, goal);
            match chain.joints.get_mut(index + 1) {
                Some(next) => next.step_forward = true,
                None => chain.joints[count - 1].step_backward = true,
            }
        }

        log::trace!(
            "chain '{}' single step {} joint {}",
            chain.name,
            if backward { "backward" } else { "forward" },
            index
        );
        SolveResult::settled(chain, 1)
    }
}
