use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec3};

use crate::creature::Creature;
use crate::error::CreatureError;
use crate::ik::{AnchorState, Chain, ChainBuilder, RootMode, Target};
use crate::math::Transform;
use crate::render::JointInstance;

fn assert_vec(actual: Vec3, expected: Vec3) {
    assert!(
        (actual - expected).length() < 1e-4,
        "expected {expected:?}, got {actual:?}"
    );
}

fn leg() -> ChainBuilder {
    Chain::builder().add_joint(0.6).add_joint(0.6)
}

fn hip(x: f32, y: f32) -> Transform {
    // +X pointing down.
    Transform::new(Vec3::new(x, y, 0.0), Quat::from_rotation_y(FRAC_PI_2))
}

fn biped() -> Creature {
    Creature::builder(Transform::from_position(Vec3::new(0.0, 0.0, 1.0)))
        .chain("left", hip(0.0, 0.3), leg())
        .chain("right", hip(0.0, -0.3), leg())
        .chain(
            "neck",
            Transform::from_position(Vec3::new(0.8, 0.0, 0.0)),
            Chain::builder().add_joint(0.3).add_joint(0.3),
        )
        .chain_on(
            "head",
            "neck",
            Transform::IDENTITY,
            Chain::builder().add_joint(0.2),
        )
        .build()
        .unwrap()
}

#[test]
fn chains_hang_from_their_mounts() {
    let creature = biped();
    assert_eq!(creature.chain_count(), 4);
    let left = creature.chain_by_name("left");
    assert_vec(left.base(), Vec3::new(0.0, 0.3, 1.0));
    assert_vec(left.end_effector(), Vec3::new(0.0, 0.3, -0.2));

    let head = creature.chain_by_name("head");
    assert_vec(head.base(), Vec3::new(1.4, 0.0, 1.0));
    let neck = creature.chain_id("neck").unwrap();
    assert_eq!(head.parent(), Some(neck));
    assert_eq!(creature.chain(neck).children(), &[creature.chain_id("head").unwrap()]);
}

#[test]
fn rejects_bad_topology() {
    let duplicate = Creature::builder(Transform::IDENTITY)
        .chain("a", Transform::IDENTITY, leg())
        .chain("a", Transform::IDENTITY, leg())
        .build();
    assert_eq!(
        duplicate.unwrap_err(),
        CreatureError::DuplicateChain { name: "a".into() }
    );

    let forward_reference = Creature::builder(Transform::IDENTITY)
        .chain_on("head", "neck", Transform::IDENTITY, leg())
        .chain("neck", Transform::IDENTITY, leg())
        .build();
    assert_eq!(
        forward_reference.unwrap_err(),
        CreatureError::UnknownParentChain {
            chain: "head".into(),
            parent: "neck".into()
        }
    );

    let empty = Creature::builder(Transform::IDENTITY)
        .chain("tail", Transform::IDENTITY, Chain::builder())
        .build();
    assert_eq!(empty.unwrap_err(), CreatureError::EmptyChain { name: "tail".into() });

    let zero = Creature::builder(Transform::IDENTITY)
        .chain("tail", Transform::IDENTITY, Chain::builder().add_joint(1.0).add_joint(0.0))
        .build();
    assert!(matches!(
        zero.unwrap_err(),
        CreatureError::InvalidLength { index: 1, .. }
    ));
}

#[test]
#[should_panic(expected = "no chain named 'wing'")]
fn unknown_chain_name_is_fatal() {
    biped().chain_by_name("wing");
}

#[test]
fn lookups_report_unknown_names() {
    let creature = biped();
    assert_eq!(
        creature.find_chain("wing").unwrap_err(),
        CreatureError::UnknownChain { name: "wing".into() }
    );
    assert!(creature.end_effector_distance_from_root("wing").is_err());
}

#[test]
fn chains_follow_the_root() {
    let mut creature = biped();
    creature.set_root_transform(Transform::from_position(Vec3::new(1.0, 0.0, 1.0)));
    creature.update(0.016);

    assert_vec(creature.root().position(), Vec3::new(1.0, 0.0, 1.0));
    assert_vec(creature.chain_by_name("left").base(), Vec3::new(1.0, 0.3, 1.0));
    assert_vec(creature.chain_by_name("right").base(), Vec3::new(1.0, -0.3, 1.0));
}

#[test]
fn child_chain_rides_on_parent_end() {
    let mut creature = biped();
    creature
        .chain_by_name_mut("neck")
        .target_mut()
        .set_position(Vec3::new(1.1, 0.0, 1.4));
    creature.update(0.016);

    let neck_end = creature.chain_by_name("neck").end_effector();
    assert_vec(neck_end, Vec3::new(1.1, 0.0, 1.4));
    assert_vec(creature.chain_by_name("head").base(), neck_end);
}

#[test]
fn distances_are_measured_from_the_root() {
    let creature = biped();
    assert!((creature.distance_from_root(Vec3::new(0.0, 0.0, 3.0)) - 2.0).abs() < 1e-6);
    let left = creature.end_effector_distance_from_root("left").unwrap();
    let expected = Vec3::new(0.0, 0.3, -1.2).length();
    assert!((left - expected).abs() < 1e-4);
}

#[test]
fn anchor_handshake_between_chains() {
    let mut creature = biped();
    let left = creature.chain_id("left").unwrap();
    let right = creature.chain_id("right").unwrap();

    assert!(creature.try_unlock_and_toggle_anchor(right, left).unwrap());
    assert_eq!(creature.chain(right).anchor_state(), AnchorState::Moving);
    assert_eq!(creature.chain(left).anchor_state(), AnchorState::Locked);

    assert!(!creature.try_unlock_and_toggle_anchor(left, right).unwrap());
    assert_eq!(
        creature.try_unlock_and_toggle_anchor(left, left).unwrap_err(),
        CreatureError::SelfPartner { name: "left".into() }
    );
}

#[test]
fn render_reports_every_joint() {
    let mut creature = biped();
    creature
        .chain_by_name_mut("left")
        .target_mut()
        .set_position(Vec3::new(0.3, 0.3, 0.0));
    creature.update(0.016);

    let mut instances: Vec<JointInstance> = Vec::new();
    creature.render(&mut instances);
    assert_eq!(instances.len(), 7);

    let left = creature.chain_by_name("left");
    assert_vec(instances[0].start(), left.base());
    assert_vec(instances[1].end(), left.end_effector());
}

#[test]
fn dragged_chain_keeps_its_own_root() {
    let mut creature = Creature::builder(Transform::IDENTITY)
        .chain(
            "tail",
            Transform::IDENTITY,
            Chain::builder()
                .add_joint(1.0)
                .add_joint(1.0)
                .root_mode(RootMode::Dragged)
                .target(Target::new(Vec3::new(3.0, 1.0, 0.0))),
        )
        .build()
        .unwrap();
    creature.update(0.016);

    let tail = creature.chain_by_name("tail");
    assert!(tail.distance_to_target() < 1e-4);
    assert!(tail.base().distance(Vec3::ZERO) > 0.5);
}
