//! Per-constraint-kind drag primitives.
//!
//! Every joint update funnels through [`drag`], which looks up a pure function by
//! constraint kind and chain topology. Functions work in the reference frame's local
//! coordinates (reference forward = +X, left = +Y, up = +Z) and hand back a world frame,
//! leaving the joint's `euler` relative to that reference.

use glam::{Quat, Vec3};

use super::constraint::ConstraintKind;
use super::joint::Joint;
use super::two_bone;
use crate::math::{orthogonal_part, safe_normalize, signed_angle, Euler, Frame};

/// Where a joint sits in its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topology {
    /// No parent, no child.
    Only = 0,
    /// No parent, has a child.
    First = 1,
    /// Has a parent, no child.
    Final = 2,
    /// Parent and child.
    Interior = 3,
}

impl Topology {
    pub const COUNT: usize = 4;

    pub fn of(index: usize, joint_count: usize) -> Self {
        let has_parent = index > 0;
        let has_child = index + 1 < joint_count;
        match (has_parent, has_child) {
            (false, false) => Topology::Only,
            (false, true) => Topology::First,
            (true, false) => Topology::Final,
            (true, true) => Topology::Interior,
        }
    }

    pub fn is_root(self) -> bool {
        matches!(self, Topology::Only | Topology::First)
    }
}

/// The child segment a first joint bends around when the two-bone solve applies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChildReach {
    pub length: f32,
    /// Point the child's end should reach.
    pub reach: Vec3,
    /// Child's current forward, used to keep the existing bend plane.
    pub forward: Vec3,
}

/// Everything a drag function may read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragContext {
    /// Start of the joint for this step.
    pub origin: Vec3,
    /// Unconstrained world direction toward the pull point.
    pub desired: Vec3,
    /// Parent frame, or the chain attachment frame for the first joint.
    pub reference: Frame,
    /// World left the joint should keep while swinging.
    pub twist: Vec3,
    /// Chain target position and orientation.
    pub target: Vec3,
    pub target_frame: Frame,
    pub child: Option<ChildReach>,
    /// Creature root frame, last resort for bend axes.
    pub root: Frame,
}

impl DragContext {
    fn local_desired(&self) -> Vec3 {
        safe_normalize(self.reference.to_local(self.desired), Vec3::X)
    }

    fn finish(&self, local: &Frame) -> Frame {
        self.reference.to_world_frame(local)
    }
}

pub type DragFn = fn(&mut Joint, &DragContext) -> Frame;

/// Indexed by `[ConstraintKind as usize][Topology as usize]`.
static DRAG_TABLE: [[DragFn; Topology::COUNT]; ConstraintKind::COUNT] = [
    [drag_free, drag_free, drag_free, drag_free],
    [drag_hinge, drag_hinge, drag_hinge, drag_hinge],
    [drag_knee_root, drag_knee_root, drag_knee, drag_knee],
    [drag_ball, drag_ball, drag_ball, drag_ball],
    [euler_only, euler_first, euler_final, euler_interior],
];

pub fn drag_fn(kind: ConstraintKind, topology: Topology) -> DragFn {
    DRAG_TABLE[kind as usize][topology as usize]
}

/// Solves `joint`'s orientation for one step. Updates `euler`, the saturation flag and the
/// extraction memory; the caller owns position and frame.
pub fn drag(joint: &mut Joint, ctx: &DragContext, topology: Topology) -> Frame {
    drag_fn(joint.kind(), topology)(joint, ctx)
}

fn drag_free(joint: &mut Joint, ctx: &DragContext) -> Frame {
    let local = Frame::from_forward(ctx.local_desired(), ctx.reference.to_local(ctx.twist));
    joint.euler = Euler::from_frame(&local);
    joint.at_limit = false;
    ctx.finish(&local)
}

fn drag_hinge(joint: &mut Joint, ctx: &DragContext) -> Frame {
    let d = ctx.local_desired();
    let planar = Vec3::new(d.x, d.y, 0.0);

    let yaw = if planar.length_squared() > 1.0e-8 {
        // 180° when the segment continues straight past the hinge.
        let opening = planar.angle_between(-Vec3::X);
        let side = if planar.y >= 0.0 { 1.0 } else { -1.0 };
        side * (std::f32::consts::PI - opening)
    } else {
        joint.euler.yaw
    };

    let clamped = joint.limits().yaw.clamp(yaw);
    joint.at_limit = (clamped - yaw).abs() > 1.0e-6;
    joint.euler = Euler::new(clamped, 0.0, 0.0);
    ctx.finish(&joint.euler.to_frame())
}

fn drag_knee(joint: &mut Joint, ctx: &DragContext) -> Frame {
    let local = knee_in_plane(joint, ctx, Vec3::Y, Vec3::X);
    joint.euler = Euler::new(0.0, joint.euler.pitch, 0.0);
    ctx.finish(&local)
}

/// First joint: the bend plane follows the target's left, measured from the attachment forward.
fn drag_knee_root(joint: &mut Joint, ctx: &DragContext) -> Frame {
    let normal = safe_normalize(ctx.reference.to_local(ctx.target_frame.left), Vec3::Y);
    let normal = if normal.dot(Vec3::X).abs() > 0.999 {
        Vec3::Y
    } else {
        normal
    };
    let reference_dir = orthogonal_part(Vec3::X, normal).unwrap_or(Vec3::X);
    let local = knee_in_plane(joint, ctx, normal, reference_dir);
    joint.euler = if normal.abs_diff_eq(Vec3::Y, 1.0e-6) {
        Euler::new(0.0, joint.euler.pitch, 0.0)
    } else {
        Euler::from_frame(&local)
    };
    ctx.finish(&local)
}

/// Projects the desired direction onto the plane with `normal` and clamps the signed
/// in-plane angle from `reference_dir` to the pitch range. Leaves the clamped angle in
/// `joint.euler.pitch`.
fn knee_in_plane(joint: &mut Joint, ctx: &DragContext, normal: Vec3, reference_dir: Vec3) -> Frame {
    let d = ctx.local_desired();
    let pitch = match orthogonal_part(d, normal) {
        Some(in_plane) => signed_angle(reference_dir, in_plane, normal),
        None => joint.euler.pitch,
    };
    let clamped = joint.limits().pitch.clamp(pitch);
    joint.at_limit = (clamped - pitch).abs() > 1.0e-6;
    joint.euler.pitch = clamped;
    let forward = Quat::from_axis_angle(normal, clamped) * reference_dir;
    Frame::from_forward(forward, normal)
}

/// Swing limited to a cone around the reference forward.
pub(crate) fn clamp_cone(direction: Vec3, max_angle: f32) -> Vec3 {
    let angle = direction.angle_between(Vec3::X);
    if angle <= max_angle {
        return direction;
    }
    let axis = Vec3::X.cross(direction);
    let axis = if axis.length_squared() < 1.0e-8 {
        Vec3::Z
    } else {
        axis.normalize()
    };
    Quat::from_axis_angle(axis, max_angle) * Vec3::X
}

fn drag_ball(joint: &mut Joint, ctx: &DragContext) -> Frame {
    let d = ctx.local_desired();
    let limits = *joint.limits();
    let cone = limits.yaw.magnitude();

    let mut local = Frame::from_forward(d, ctx.reference.to_local(ctx.twist));
    let mut saturated = false;

    // A single clamp leaves residual error once the triad is rebuilt, so run it twice.
    for _ in 0..2 {
        let forward = clamp_cone(local.forward, cone);
        let swing = Euler::from_frame(&Frame::from_forward(forward, local.left));
        // Past 90° a direction inside the cone can still decompose to a yaw beyond it;
        // pulling the yaw back in never leaves the cone.
        let clamped = limits.clamp(swing);
        saturated |= forward.distance_squared(local.forward) > 1.0e-10 || clamped != swing;
        local = clamped.to_frame().orthonormalized();
    }

    joint.at_limit = saturated;
    joint.euler = Euler::from_frame(&local);
    ctx.finish(&local)
}

fn euler_only(joint: &mut Joint, ctx: &DragContext) -> Frame {
    let desired = safe_normalize(ctx.target - ctx.origin, ctx.desired);
    solve_euler(joint, ctx, desired, ctx.target_frame.left)
}

fn euler_first(joint: &mut Joint, ctx: &DragContext) -> Frame {
    let desired = ctx
        .child
        .and_then(|child| {
            let direction = safe_normalize(child.reach - ctx.origin, ctx.desired);
            let pole = joint.pole.map(|p| p - ctx.origin);
            let axis = two_bone::bend_axis(
                direction,
                pole,
                joint.frame.forward,
                child.forward,
                &[ctx.root.left, ctx.root.up],
            );
            two_bone::solve(ctx.origin, child.reach, joint.length, child.length, axis)
        })
        .map(|pose| {
            let end = ctx.origin + pose.upper * joint.length;
            safe_normalize(end - ctx.origin, ctx.desired)
        })
        .unwrap_or(ctx.desired);
    solve_euler(joint, ctx, desired, ctx.reference.left)
}

fn euler_final(joint: &mut Joint, ctx: &DragContext) -> Frame {
    let desired = safe_normalize(ctx.target - ctx.origin, ctx.desired);
    solve_euler(joint, ctx, desired, ctx.target_frame.left)
}

fn euler_interior(joint: &mut Joint, ctx: &DragContext) -> Frame {
    solve_euler(joint, ctx, ctx.desired, ctx.reference.left)
}

/// Extract, clamp, rebuild relative to the reference.
fn solve_euler(joint: &mut Joint, ctx: &DragContext, desired: Vec3, twist: Vec3) -> Frame {
    let local_forward = safe_normalize(ctx.reference.to_local(desired), Vec3::X);
    let mut euler = joint.extract_euler_from_forward(local_forward);
    euler.roll = euler.roll_to_match(ctx.reference.to_local(twist));
    joint.euler = euler;
    joint.clamp_euler();
    ctx.finish(&joint.euler.to_frame())
}
