use glam::Vec3;

use super::anchor::AnchorState;
use super::constraint::JointConstraint;
use super::drag::{ChildReach, DragContext};
use super::joint::{Joint, JointConfig};
use super::ccd::CcdSolver;
use super::solver::{FabrikSolver, SolveResult};
use super::target::Target;
use crate::math::{safe_normalize, Euler, Frame, Transform};

/// Index of a chain inside its creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(pub(crate) usize);

impl ChainId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    #[default]
    Fabrik,
    Ccd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootMode {
    /// Joint 0 is pinned to the attachment every pass.
    #[default]
    Anchored,
    /// The end is placed on the target and the rest of the chain is dragged behind it.
    Dragged,
}

/// Fixed-length sequence of joints, root first, chasing one target.
#[derive(Debug, Clone)]
pub struct Chain {
    pub(crate) name: String,
    pub(crate) joints: Vec<Joint>,
    pub(crate) attach: Transform,
    pub(crate) root_frame: Frame,
    pub(crate) target: Target,
    pub(crate) anchor: AnchorState,
    pub(crate) solver: SolverKind,
    pub(crate) root_mode: RootMode,
    pub(crate) tolerance: f32,
    pub(crate) max_iterations: u32,
    pub(crate) ccd_iterations: u32,
    pub(crate) single_step: bool,
    pub(crate) parent: Option<ChainId>,
    pub(crate) children: Vec<ChainId>,
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn joint_mut(&mut self, index: usize) -> Option<&mut Joint> {
        self.joints.get_mut(index)
    }

    pub fn bone_lengths(&self) -> impl Iterator<Item = f32> + '_ {
        self.joints.iter().map(|j| j.length)
    }

    pub fn total_length(&self) -> f32 {
        self.bone_lengths().sum()
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn ccd_iterations(&self) -> u32 {
        self.ccd_iterations
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn end_effector(&self) -> Vec3 {
        self.joints
            .last()
            .map(Joint::compute_end)
            .unwrap_or(self.attach.position)
    }

    pub fn tip_frame(&self) -> Frame {
        self.joints
            .last()
            .map(|j| j.frame)
            .unwrap_or_else(|| self.attach.frame())
    }

    pub fn base(&self) -> Vec3 {
        self.attach.position
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.joints.iter().map(|j| j.position)
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut Target {
        &mut self.target
    }

    pub fn attach(&self) -> &Transform {
        &self.attach
    }

    /// Moves the chain's root placement. Takes effect on the next solve.
    pub fn set_attach(&mut self, attach: Transform) {
        self.attach = attach;
    }

    pub fn root_frame(&self) -> &Frame {
        &self.root_frame
    }

    pub fn set_root_frame(&mut self, frame: Frame) {
        self.root_frame = frame;
    }

    pub fn solver(&self) -> SolverKind {
        self.solver
    }

    pub fn set_solver(&mut self, solver: SolverKind) {
        self.solver = solver;
    }

    pub fn root_mode(&self) -> RootMode {
        self.root_mode
    }

    pub fn is_single_step(&self) -> bool {
        self.single_step
    }

    pub fn set_single_step(&mut self, single_step: bool) {
        self.single_step = single_step;
        if !single_step {
            for joint in &mut self.joints {
                joint.step_forward = false;
                joint.step_backward = false;
            }
        }
    }

    pub fn parent(&self) -> Option<ChainId> {
        self.parent
    }

    pub fn children(&self) -> &[ChainId] {
        &self.children
    }

    pub fn anchor_state(&self) -> AnchorState {
        self.anchor
    }

    pub fn set_anchor_state(&mut self, state: AnchorState) {
        self.anchor = state;
    }

    pub fn can_move(&self) -> bool {
        self.anchor.can_move()
    }

    /// See [`AnchorState::try_unlock_and_toggle`].
    pub fn try_unlock_and_toggle_anchor(&mut self, partner: &mut Chain) -> bool {
        let before = (self.anchor, partner.anchor);
        let ok = self.anchor.try_unlock_and_toggle(&mut partner.anchor);
        if ok && before != (self.anchor, partner.anchor) {
            log::debug!(
                "anchor '{}' {:?} -> {:?}, partner '{}' {:?} -> {:?}",
                self.name,
                before.0,
                self.anchor,
                partner.name,
                before.1,
                partner.anchor
            );
        }
        ok
    }

    pub fn distance_to_target(&self) -> f32 {
        self.end_effector().distance(self.target.position())
    }

    /// Distance from the chain's attachment to its end effector.
    pub fn anchor_distance(&self) -> f32 {
        self.end_effector().distance(self.attach.position)
    }

    /// Yaw/pitch/roll of joint `index` relative to its parent, read back from world frames.
    pub fn local_angles(&self, index: usize) -> Option<Euler> {
        let joint = self.joints.get(index)?;
        Some(Euler::from_frame(
            &self.reference_frame(index).to_local_frame(&joint.frame),
        ))
    }

    /// Composes every ancestor's local transform onto the attachment. O(index).
    pub fn world_transform(&self, index: usize) -> Option<Transform> {
        if index >= self.joints.len() {
            return None;
        }
        let mut world = self.attach;
        let mut parent_length = 0.0;
        for joint in &self.joints[..=index] {
            world = world * joint.local_transform(parent_length);
            parent_length = joint.length;
        }
        Some(world)
    }

    /// Runs the configured solver toward the target's current position.
    pub fn solve(&mut self) -> SolveResult {
        match self.solver {
            SolverKind::Fabrik => FabrikSolver::solve(self),
            SolverKind::Ccd => CcdSolver::solve(self),
        }
    }

    /// Advances the staged target, settles the anchor once a step lands, then solves.
    pub fn update(&mut self, dt: f32) -> SolveResult {
        let resting = self.target.advance(dt);
        if resting && self.anchor == AnchorState::Moving {
            log::debug!("chain '{}' landed", self.name);
            self.anchor = AnchorState::Free;
        }
        self.solve()
    }

    pub(crate) fn reference_frame(&self, index: usize) -> Frame {
        match index {
            0 => self.attach.frame(),
            i => self.joints[i - 1].frame,
        }
    }

    /// Context for joint `index` pulled toward `pull`.
    pub(crate) fn drag_context(&self, index: usize, pull: Vec3, child: Option<ChildReach>) -> DragContext {
        let joint = &self.joints[index];
        let reference = self.reference_frame(index);
        let is_tip = index + 1 == self.joints.len();
        DragContext {
            origin: joint.position,
            desired: safe_normalize(pull - joint.position, joint.frame.forward),
            reference,
            twist: if is_tip {
                self.target.frame().left
            } else {
                reference.left
            },
            target: self.target.position(),
            target_frame: *self.target.frame(),
            child,
            root: self.root_frame,
        }
    }

    /// Forward kinematics from joint `from` onward using the stored local angles.
    pub(crate) fn rebuild_from_angles(&mut self, from: usize) {
        for i in from..self.joints.len() {
            let (origin, reference) = match i {
                0 => (self.attach.position, self.attach.frame()),
                _ => (self.joints[i - 1].compute_end(), self.joints[i - 1].frame),
            };
            let joint = &mut self.joints[i];
            joint.position = origin;
            joint.frame = reference.to_world_frame(&joint.euler.to_frame());
        }
    }
}

pub struct ChainBuilder {
    joints: Vec<Joint>,
    tolerance: f32,
    max_iterations: u32,
    ccd_iterations: u32,
    solver: SolverKind,
    root_mode: RootMode,
    single_step: bool,
    target: Option<Target>,
    attach: Transform,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            joints: Vec::new(),
            tolerance: 0.001,
            max_iterations: 10,
            ccd_iterations: 5,
            solver: SolverKind::Fabrik,
            root_mode: RootMode::Anchored,
            single_step: false,
            target: None,
            attach: Transform::IDENTITY,
        }
    }

    /// Appends an unconstrained joint.
    pub fn add_joint(self, length: f32) -> Self {
        self.add_joint_config(JointConfig::new(length))
    }

    pub fn add_joint_with_constraint(self, length: f32, constraint: JointConstraint) -> Self {
        self.add_joint_config(JointConfig::new(length).with_constraint(constraint))
    }

    pub fn add_joint_config(mut self, config: JointConfig) -> Self {
        let mut joint = Joint::from_config(config);
        joint.index = self.joints.len();
        self.joints.push(joint);
        self
    }

    /// Sets the pole of the most recently added joint.
    pub fn pole(mut self, pole: Vec3) -> Self {
        if let Some(joint) = self.joints.last_mut() {
            joint.pole = Some(pole);
        }
        self
    }

    pub fn tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn ccd_iterations(mut self, ccd_iterations: u32) -> Self {
        self.ccd_iterations = ccd_iterations;
        self
    }

    pub fn solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    pub fn root_mode(mut self, root_mode: RootMode) -> Self {
        self.root_mode = root_mode;
        self
    }

    pub fn single_step(mut self, single_step: bool) -> Self {
        self.single_step = single_step;
        self
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn attach(mut self, attach: Transform) -> Self {
        self.attach = attach;
        self
    }

    pub(crate) fn joint_lengths(&self) -> impl Iterator<Item = f32> + '_ {
        self.joints.iter().map(|j| j.length)
    }

    pub fn build(self) -> Chain {
        let mut chain = Chain {
            name: String::new(),
            joints: self.joints,
            attach: self.attach,
            root_frame: self.attach.frame(),
            target: Target::new(Vec3::ZERO),
            anchor: AnchorState::Free,
            solver: self.solver,
            root_mode: self.root_mode,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            ccd_iterations: self.ccd_iterations,
            single_step: self.single_step,
            parent: None,
            children: Vec::new(),
        };
        chain.rebuild_from_angles(0);
        chain.target = self
            .target
            .unwrap_or_else(|| Target::new(chain.end_effector()).with_frame(chain.tip_frame()));
        chain
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}
