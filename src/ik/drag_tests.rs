use glam::Vec3;

use crate::ik::constraint::{AngleRange, JointConstraint};
use crate::ik::drag::{drag, ChildReach, DragContext, Topology};
use crate::ik::joint::Joint;
use crate::math::{Euler, Frame};

fn ctx(desired: Vec3) -> DragContext {
    DragContext {
        origin: Vec3::ZERO,
        desired: desired.normalize(),
        reference: Frame::IDENTITY,
        twist: Vec3::Y,
        target: desired * 10.0,
        target_frame: Frame::IDENTITY,
        child: None,
        root: Frame::IDENTITY,
    }
}

fn assert_vec(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-4,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn topology_covers_all_four_cases() {
    assert_eq!(Topology::of(0, 1), Topology::Only);
    assert_eq!(Topology::of(0, 3), Topology::First);
    assert_eq!(Topology::of(2, 3), Topology::Final);
    assert_eq!(Topology::of(1, 3), Topology::Interior);
}

#[test]
fn free_joint_points_exactly_at_desired() {
    let mut joint = Joint::new(1.0);
    let desired = Vec3::new(-0.3, 0.8, 0.5).normalize();
    let frame = drag(&mut joint, &ctx(desired), Topology::Interior);
    assert_vec(frame.forward, desired);
    assert!(!joint.is_at_limit());
}

#[test]
fn hinge_clamps_swing_about_up() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::hinge(-45.0, 45.0));
    let frame = drag(&mut joint, &ctx(Vec3::Y), Topology::Interior);
    let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
    assert_vec(frame.forward, expected);
    assert!((joint.euler().yaw - 45f32.to_radians()).abs() < 1e-4);
    assert_eq!(joint.euler().pitch, 0.0);
    assert!(joint.is_at_limit());
}

#[test]
fn hinge_ignores_out_of_plane_component() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::hinge(-90.0, 90.0));
    let frame = drag(&mut joint, &ctx(Vec3::new(1.0, 1.0, 1.0)), Topology::Final);
    assert_vec(frame.forward, Vec3::new(1.0, 1.0, 0.0).normalize());
    assert!(!joint.is_at_limit());
}

#[test]
fn knee_clamps_bend_to_pitch_range() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::knee(0.0, 60.0));
    let frame = drag(&mut joint, &ctx(-Vec3::Z), Topology::Interior);
    let (s, c) = 60f32.to_radians().sin_cos();
    assert_vec(frame.forward, Vec3::new(c, 0.0, -s));
    assert_vec(frame.left, Vec3::Y);
    assert!((joint.euler().pitch - 60f32.to_radians()).abs() < 1e-4);
}

#[test]
fn knee_refuses_to_bend_backwards() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::knee(0.0, 120.0));
    let frame = drag(&mut joint, &ctx(Vec3::new(0.2, 0.0, 1.0)), Topology::Interior);
    assert_vec(frame.forward, Vec3::X);
    assert!(joint.is_at_limit());
}

#[test]
fn root_knee_bends_in_target_plane() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::knee(-90.0, 90.0));
    let frame = drag(&mut joint, &ctx(Vec3::new(1.0, 0.0, -1.0)), Topology::First);
    assert_vec(frame.forward, Vec3::new(1.0, 0.0, -1.0).normalize());
    assert!((joint.euler().pitch - 45f32.to_radians()).abs() < 1e-4);
}

#[test]
fn root_knee_limits_hold_in_a_turned_target_plane() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::knee(-10.0, 80.0));
    let turn = Euler::new(0.6, 0.0, 0.0).to_frame();
    let desired = turn.to_world(Vec3::new(1.0, 0.0, -1.0).normalize());
    let mut context = ctx(desired);
    context.target_frame = turn;
    let frame = drag(&mut joint, &context, Topology::First);

    assert_vec(frame.forward, desired);
    assert_vec(frame.left, turn.left);
    assert!((joint.euler().yaw - 0.6).abs() < 1e-4);
    assert!((joint.euler().pitch - 45f32.to_radians()).abs() < 1e-4);
    assert!(joint.limits().contains(joint.euler(), 1e-4), "{:?}", joint.euler());
}

#[test]
fn wide_ball_socket_keeps_yaw_inside_cone() {
    let cone = 120f32.to_radians();
    let wide = JointConstraint::ball_socket(120.0, -20.0, 20.0);
    for desired in [
        Vec3::new(-1.0, 0.2, 0.3),
        Vec3::new(0.0, 0.1, -1.5),
        Vec3::new(-0.4, -1.0, 0.9),
    ] {
        let mut joint = Joint::new(1.0).with_constraint(wide);
        let frame = drag(&mut joint, &ctx(desired), Topology::Interior);

        assert!(frame.forward.angle_between(Vec3::X) <= cone + 1e-3, "{:?}", frame.forward);
        assert!(joint.limits().contains(joint.euler(), 1e-3), "{desired:?}: {:?}", joint.euler());
        assert_vec(joint.euler().to_frame().forward, frame.forward);
    }
}

#[test]
fn ball_socket_limits_cone_and_roll() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::ball_socket(30.0, -10.0, 10.0));
    let mut context = ctx(Vec3::Y);
    // Ask for a heavily twisted left as well.
    context.twist = Vec3::Z;
    let frame = drag(&mut joint, &context, Topology::Interior);
    let swing = frame.forward.angle_between(Vec3::X);
    assert!(swing <= 30f32.to_radians() + 1e-3, "swing {swing}");
    assert!(joint.euler().roll.abs() <= 10f32.to_radians() + 1e-3);
    assert!(joint.limits().contains(joint.euler(), 1e-3));
    assert!(joint.is_at_limit());
}

#[test]
fn full_euler_keeps_reachable_direction() {
    let limits = AngleRange::symmetric_degrees(60.0);
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::euler(limits, limits, limits));
    let desired = Vec3::new(1.0, 0.3, -0.2).normalize();
    let frame = drag(&mut joint, &ctx(desired), Topology::Interior);
    assert_vec(frame.forward, desired);
    assert!(!joint.is_at_limit());
}

#[test]
fn full_euler_clamps_each_axis() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::euler(
        AngleRange::symmetric_degrees(20.0),
        AngleRange::symmetric_degrees(10.0),
        AngleRange::LOCKED,
    ));
    let desired = Vec3::new(1.0, 1.0, -1.0).normalize();
    let frame = drag(&mut joint, &ctx(desired), Topology::Interior);
    let expected = Euler::from_degrees(20.0, 10.0, 0.0).forward();
    assert_vec(frame.forward, expected);
    assert!(joint.is_at_limit());
}

#[test]
fn full_euler_only_joint_inherits_target_twist() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::euler(
        AngleRange::FREE,
        AngleRange::FREE,
        AngleRange::FREE,
    ));
    let mut context = ctx(Vec3::X);
    let roll = 0.6f32;
    context.target_frame = Euler::new(0.0, 0.0, roll).to_frame();
    let frame = drag(&mut joint, &context, Topology::Only);
    assert_vec(frame.forward, Vec3::X);
    assert_vec(frame.left, context.target_frame.left);
    assert!((joint.euler().roll - roll).abs() < 1e-4);
}

#[test]
fn full_euler_first_joint_bends_toward_child_reach() {
    let free = AngleRange::FREE;
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::euler(free, free, free));
    let mut context = ctx(Vec3::X);
    context.child = Some(ChildReach {
        length: 1.0,
        reach: Vec3::new(1.2, 0.0, 0.0),
        forward: Vec3::X,
    });
    let frame = drag(&mut joint, &context, Topology::First);
    // Elbow leaves the straight line so the child can reach 1.2 away.
    let elbow = frame.forward;
    assert!((elbow.x - 0.6).abs() < 1e-3, "elbow {elbow:?}");
    assert!((Vec3::new(1.2, 0.0, 0.0) - elbow).length() - 1.0 < 1e-3);
}

#[test]
fn drag_is_relative_to_reference_frame() {
    let mut joint = Joint::new(1.0).with_constraint(JointConstraint::hinge(-10.0, 10.0));
    let mut context = ctx(Vec3::X);
    context.reference = Euler::from_degrees(90.0, 0.0, 0.0).to_frame();
    // World +X is 90° to the right of a reference facing +Y.
    let frame = drag(&mut joint, &context, Topology::Interior);
    let expected = Euler::from_degrees(80.0, 0.0, 0.0).forward();
    assert_vec(frame.forward, expected);
    assert!((joint.euler().yaw + 10f32.to_radians()).abs() < 1e-4);
}
