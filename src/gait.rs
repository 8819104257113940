//! Reference gait layer.
//!
//! Decides when a leg should step and where to, using only what a creature exposes: chain
//! targets, end effectors, attachments and the anchor handshake. Finding the ground is the
//! caller's job; the probe closure hands back an impact point or nothing.

use glam::Vec3;

use crate::creature::Creature;
use crate::dynamics::StepShape;
use crate::error::CreatureError;
use crate::ik::{AnchorState, ChainId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaitConfig {
    /// Distance between the planted foot and its ground point that starts a step.
    pub step_threshold: f32,
    /// Fraction of a leg's total length past which a planted foot steps regardless.
    pub overstretch: f32,
    pub step: StepShape,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            step_threshold: 0.6,
            overstretch: 0.95,
            step: StepShape::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Leg {
    chain: ChainId,
    partner: ChainId,
    /// Root-local point the ground probe starts from.
    home: Vec3,
}

#[derive(Debug, Clone, Default)]
pub struct Gait {
    config: GaitConfig,
    legs: Vec<Leg>,
}

impl Gait {
    pub fn new(config: GaitConfig) -> Self {
        Self {
            config,
            legs: Vec::new(),
        }
    }

    pub fn config(&self) -> &GaitConfig {
        &self.config
    }

    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Registers two legs that must never be in the air together.
    pub fn add_pair(
        &mut self,
        creature: &Creature,
        (first, first_home): (&str, Vec3),
        (second, second_home): (&str, Vec3),
    ) -> Result<(), CreatureError> {
        let a = creature.chain_id(first)?;
        let b = creature.chain_id(second)?;
        if a == b {
            return Err(CreatureError::SelfPartner {
                name: first.to_string(),
            });
        }
        self.legs.push(Leg {
            chain: a,
            partner: b,
            home: first_home,
        });
        self.legs.push(Leg {
            chain: b,
            partner: a,
            home: second_home,
        });
        Ok(())
    }

    /// Teleports every foot onto its ground point. Feet whose probe misses stay put.
    pub fn plant<F>(&self, creature: &mut Creature, mut ground: F)
    where
        F: FnMut(Vec3) -> Option<Vec3>,
    {
        let root = *creature.root_transform();
        for leg in &self.legs {
            if let Some(point) = ground(root.transform_point(leg.home)) {
                creature.chain_mut(leg.chain).target_mut().set_position(point);
            }
        }
    }

    /// Starts whatever steps are due this frame and returns how many began.
    ///
    /// Run before [`Creature::update`], which then advances the steps and solves.
    pub fn update<F>(&mut self, creature: &mut Creature, mut ground: F) -> usize
    where
        F: FnMut(Vec3) -> Option<Vec3>,
    {
        let root = *creature.root_transform();
        let mut started = 0;

        for leg in &self.legs {
            let Some(point) = ground(root.transform_point(leg.home)) else {
                continue;
            };

            let chain = creature.chain(leg.chain);
            if chain.target().is_stepping() {
                continue;
            }
            if creature.chain(leg.partner).anchor_state() == AnchorState::Moving {
                continue;
            }

            let planted = chain.target().goal();
            let drift = planted.distance(point);
            let stretch = planted.distance(chain.base());
            let overstretched = stretch > chain.total_length() * self.config.overstretch;
            if drift <= self.config.step_threshold && !overstretched {
                continue;
            }

            // Legs are registered from this creature, so the handshake cannot be rejected.
            if !creature
                .try_unlock_and_toggle_anchor(leg.chain, leg.partner)
                .unwrap_or(false)
            {
                continue;
            }

            log::debug!(
                "'{}' stepping {:.3} (overstretched: {})",
                creature.chain(leg.chain).name(),
                drift,
                overstretched
            );
            creature
                .chain_mut(leg.chain)
                .target_mut()
                .begin_step(point, self.config.step, root.up());
            started += 1;
        }

        started
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ik::Chain;
    use crate::math::Transform;
    use glam::Quat;
    use std::f32::consts::FRAC_PI_2;

    fn flat(point: Vec3) -> Option<Vec3> {
        Some(Vec3::new(point.x, point.y, 0.0))
    }

    fn biped() -> (Creature, Gait) {
        let down = Quat::from_rotation_y(FRAC_PI_2);
        let leg = || Chain::builder().add_joint(0.6).add_joint(0.6);
        let creature = Creature::builder(Transform::from_position(Vec3::new(0.0, 0.0, 1.0)))
            .chain("left", Transform::new(Vec3::new(0.0, 0.3, 0.0), down), leg())
            .chain("right", Transform::new(Vec3::new(0.0, -0.3, 0.0), down), leg())
            .build()
            .unwrap();
        let mut gait = Gait::new(GaitConfig {
            step_threshold: 0.2,
            ..GaitConfig::default()
        });
        gait.add_pair(
            &creature,
            ("left", Vec3::new(0.0, 0.3, -1.0)),
            ("right", Vec3::new(0.0, -0.3, -1.0)),
        )
        .unwrap();
        (creature, gait)
    }

    #[test]
    fn plant_puts_feet_on_the_ground() {
        let (mut creature, gait) = biped();
        gait.plant(&mut creature, flat);
        assert_eq!(
            creature.chain_by_name("left").target().position(),
            Vec3::new(0.0, 0.3, 0.0)
        );
        assert_eq!(gait.leg_count(), 2);
    }

    #[test]
    fn drift_triggers_one_leg_at_a_time() {
        let (mut creature, mut gait) = biped();
        gait.plant(&mut creature, flat);
        assert_eq!(gait.update(&mut creature, flat), 0);

        creature.set_root_transform(Transform::from_position(Vec3::new(0.3, 0.0, 1.0)));
        assert_eq!(gait.update(&mut creature, flat), 1);

        let left = creature.chain_by_name("left");
        let right = creature.chain_by_name("right");
        assert_eq!(left.anchor_state(), AnchorState::Moving);
        assert_eq!(right.anchor_state(), AnchorState::Locked);
        assert_eq!(left.target().goal(), Vec3::new(0.3, 0.3, 0.0));
    }

    #[test]
    fn missing_ground_never_steps() {
        let (mut creature, mut gait) = biped();
        gait.plant(&mut creature, flat);
        creature.set_root_transform(Transform::from_position(Vec3::new(2.0, 0.0, 1.0)));
        assert_eq!(gait.update(&mut creature, |_| None), 0);
    }

    #[test]
    fn pairing_a_leg_with_itself_is_rejected() {
        let (creature, mut gait) = biped();
        let err = gait
            .add_pair(&creature, ("left", Vec3::ZERO), ("left", Vec3::ZERO))
            .unwrap_err();
        assert_eq!(err, CreatureError::SelfPartner { name: "left".into() });
    }
}
