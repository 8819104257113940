//! # creature-ik
//!
//! Inverse kinematics for procedurally animated creature limbs.
//!
//! ## Features
//! - FABRIK with constraint-aware drags, plus an analytic two-bone bend for short limbs
//! - CCD as an alternative solver, keeping the best pose found
//! - Five joint constraint kinds (distance-only, hinge, knee, ball-and-socket, full Euler)
//! - Gimbal-safe Euler extraction that stays continuous across the vertical
//! - Anchor handshake so paired legs never lift together
//! - Creatures: a rigid root carrying named chains, with chains mounted on other chains
//!
//! ## Example
//! ```rust
//! use creature_ik::{Chain, JointConstraint, Target};
//! use glam::Vec3;
//!
//! let mut chain = Chain::builder()
//!     .add_joint(5.0)
//!     .add_joint_with_constraint(5.0, JointConstraint::hinge(-120.0, 120.0))
//!     .add_joint(5.0)
//!     .target(Target::new(Vec3::new(12.0, 0.0, 0.0)))
//!     .build();
//!
//! let result = chain.solve();
//! println!("converged: {}, iterations: {}", result.converged, result.iterations);
//! ```

pub mod creature;
pub mod dynamics;
pub mod error;
pub mod gait;
pub mod ik;
pub mod math;
pub mod render;

pub use creature::{Attachment, Creature, CreatureBuilder};
pub use dynamics::{StepCurve, StepShape};
pub use error::CreatureError;
pub use gait::{Gait, GaitConfig};
pub use ik::{
    AnchorState, AngleRange, CcdSolver, Chain, ChainBuilder, ChainId, ConstraintKind,
    FabrikSolver, Joint, JointConfig, JointConstraint, JointLimits, RootMode, SolveResult,
    SolverKind, Target,
};
pub use math::{Euler, Frame, Transform};
pub use render::{JointInstance, JointSink};
