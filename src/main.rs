use std::f32::consts::FRAC_PI_2;

use creature_ik::{
    AngleRange, Chain, Creature, CreatureError, Gait, GaitConfig, JointConfig, JointConstraint,
    JointInstance, RootMode, SolverKind, StepShape, Transform,
};
use glam::{Quat, Vec3};

const FRAME_DT: f32 = 1.0 / 60.0;
const FRAMES: u32 = 600;
const WALK_SPEED: f32 = 0.8;

fn leg() -> creature_ik::ChainBuilder {
    Chain::builder()
        .add_joint_with_constraint(
            0.55,
            JointConstraint::euler(
                AngleRange::symmetric_degrees(40.0),
                AngleRange::degrees(-80.0, 80.0),
                AngleRange::symmetric_degrees(10.0),
            ),
        )
        .add_joint_config(
            JointConfig::new(0.6)
                .with_constraint(JointConstraint::knee(-5.0, 85.0))
                .with_rest(creature_ik::Euler::from_degrees(0.0, 30.0, 0.0)),
        )
}

fn build_creature() -> Result<Creature, CreatureError> {
    // Legs hang straight down from the hips.
    let down = Quat::from_rotation_y(FRAC_PI_2);
    let hip = |x: f32, y: f32| Transform::new(Vec3::new(x, y, 0.0), down);

    Creature::builder(Transform::from_position(Vec3::new(0.0, 0.0, 0.9)))
        .chain("front_left", hip(0.6, 0.35), leg())
        .chain("front_right", hip(0.6, -0.35), leg())
        .chain("back_left", hip(-0.6, 0.35), leg())
        .chain("back_right", hip(-0.6, -0.35), leg())
        .chain(
            "neck",
            Transform::new(Vec3::new(0.7, 0.0, 0.1), Quat::from_rotation_y(-0.6)),
            Chain::builder()
                .add_joint_with_constraint(0.3, JointConstraint::ball_socket(35.0, -5.0, 5.0))
                .add_joint_with_constraint(0.3, JointConstraint::ball_socket(35.0, -5.0, 5.0)),
        )
        .chain_on(
            "head",
            "neck",
            Transform::IDENTITY,
            Chain::builder().add_joint_with_constraint(
                0.25,
                JointConstraint::hinge(-30.0, 30.0),
            ),
        )
        .chain(
            "tail",
            Transform::new(Vec3::new(-0.7, 0.0, 0.0), Quat::from_rotation_z(std::f32::consts::PI)),
            Chain::builder()
                .add_joint(0.3)
                .add_joint(0.3)
                .add_joint(0.25)
                .add_joint(0.2)
                .solver(SolverKind::Ccd),
        )
        .chain(
            "whip",
            Transform::new(Vec3::new(-0.7, 0.0, 0.05), Quat::from_rotation_z(std::f32::consts::PI)),
            Chain::builder()
                .add_joint(0.2)
                .add_joint(0.2)
                .root_mode(RootMode::Dragged),
        )
        .build()
}

fn main() -> Result<(), CreatureError> {
    env_logger::init();

    let mut creature = build_creature()?;
    let mut gait = Gait::new(GaitConfig {
        step_threshold: 0.35,
        step: StepShape::new(0.3, 0.15),
        ..GaitConfig::default()
    });
    let home = |x: f32, y: f32| Vec3::new(x, y, -1.0);
    gait.add_pair(&creature, ("front_left", home(0.6, 0.35)), ("front_right", home(0.6, -0.35)))?;
    gait.add_pair(&creature, ("back_left", home(-0.6, 0.35)), ("back_right", home(-0.6, -0.35)))?;

    let ground = |point: Vec3| Some(Vec3::new(point.x, point.y, 0.0));
    gait.plant(&mut creature, ground);

    let mut steps = 0;
    let mut instances: Vec<JointInstance> = Vec::new();

    for frame in 0..FRAMES {
        let t = frame as f32 * FRAME_DT;
        let body = Vec3::new(t * WALK_SPEED, 0.0, 0.9 + 0.03 * (t * 8.0).sin());
        creature.set_root_transform(Transform::from_position(body));

        let look = body + Vec3::new(1.4, 0.4 * (t * 1.5).sin(), 0.3);
        creature.chain_by_name_mut("neck").target_mut().set_position(look);
        let sway = body + Vec3::new(-1.2, 0.5 * (t * 3.0).sin(), -0.2);
        creature.chain_by_name_mut("tail").target_mut().set_position(sway);
        creature.chain_by_name_mut("whip").target_mut().set_position(sway + Vec3::Z * 0.3);

        steps += gait.update(&mut creature, ground);
        let results = creature.update(FRAME_DT);

        if frame % 60 == 0 {
            let worst = results
                .iter()
                .map(|r| r.final_distance)
                .fold(0.0f32, f32::max);
            log::info!(
                "t={t:.2}s body={body:.2} steps={steps} worst_distance={worst:.4}"
            );
        }
    }

    creature.render(&mut instances);
    log::info!(
        "rendered {} joints, {} bytes of instance data",
        instances.len(),
        bytemuck::cast_slice::<JointInstance, u8>(&instances).len()
    );
    for (_, chain) in creature.chains() {
        log::info!(
            "{:>12}: {:?}, end {:.2}, {:.4} from target",
            chain.name(),
            chain.anchor_state(),
            chain.end_effector(),
            chain.distance_to_target()
        );
    }

    Ok(())
}
