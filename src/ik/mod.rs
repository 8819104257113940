//! Inverse kinematics
//!
//! Joints, their constraints and the chain solvers (FABRIK and CCD).

pub mod anchor;
pub mod ccd;
pub mod chain;
pub mod constraint;
pub mod drag;
pub mod joint;
pub mod solver;
pub mod target;
pub mod two_bone;

#[cfg(test)]
mod drag_tests;

pub use anchor::AnchorState;
pub use ccd::CcdSolver;
pub use chain::{Chain, ChainBuilder, ChainId, RootMode, SolverKind};
pub use constraint::{AngleRange, ConstraintKind, JointConstraint, JointLimits};
pub use drag::{DragContext, Topology};
pub use joint::{Joint, JointConfig, LastFrame};
pub use solver::{FabrikSolver, SolveResult};
pub use target::Target;
