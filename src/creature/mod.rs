//! A rigid body carrying named IK chains.

mod builder;
#[cfg(test)]
mod creature_tests;

use std::collections::HashMap;

use glam::Vec3;

use crate::error::CreatureError;
use crate::ik::{Chain, ChainId, Joint, RootMode, SolveResult};
use crate::math::Transform;
use crate::render::JointSink;

pub use builder::CreatureBuilder;

/// Where a chain's root sits, re-evaluated every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attachment {
    /// Offset in the creature root's local space.
    Root(Transform),
    /// Offset in the tip frame of an earlier chain, placed at its end effector.
    ChainEnd { parent: ChainId, offset: Transform },
}

#[derive(Debug, Clone)]
pub struct Creature {
    root: Joint,
    root_transform: Transform,
    chains: Vec<Chain>,
    attachments: Vec<Attachment>,
    index: HashMap<String, ChainId>,
}

impl Creature {
    pub fn builder(root: Transform) -> CreatureBuilder {
        CreatureBuilder::new(root)
    }

    /// The body itself. Never solved; moved only through [`Creature::set_root_transform`].
    pub fn root(&self) -> &Joint {
        &self.root
    }

    pub fn root_transform(&self) -> &Transform {
        &self.root_transform
    }

    pub fn set_root_transform(&mut self, transform: Transform) {
        self.root_transform = transform;
        self.root.position = transform.position;
        self.root.frame = transform.frame();
    }

    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    pub fn chains(&self) -> impl Iterator<Item = (ChainId, &Chain)> {
        self.chains.iter().enumerate().map(|(i, c)| (ChainId(i), c))
    }

    pub fn chain(&self, id: ChainId) -> &Chain {
        &self.chains[id.0]
    }

    pub fn chain_mut(&mut self, id: ChainId) -> &mut Chain {
        &mut self.chains[id.0]
    }

    pub fn attachment(&self, id: ChainId) -> &Attachment {
        &self.attachments[id.0]
    }

    pub fn chain_id(&self, name: &str) -> Result<ChainId, CreatureError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| CreatureError::UnknownChain {
                name: name.to_string(),
            })
    }

    pub fn find_chain(&self, name: &str) -> Result<&Chain, CreatureError> {
        self.chain_id(name).map(|id| self.chain(id))
    }

    pub fn find_chain_mut(&mut self, name: &str) -> Result<&mut Chain, CreatureError> {
        let id = self.chain_id(name)?;
        Ok(self.chain_mut(id))
    }

    /// Looks a chain up by name.
    ///
    /// # Panics
    ///
    /// On an unknown name. Chain names are fixed when the creature is built, so a miss is a
    /// configuration bug; use [`Creature::find_chain`] to probe.
    pub fn chain_by_name(&self, name: &str) -> &Chain {
        match self.find_chain(name) {
            Ok(chain) => chain,
            Err(err) => panic!("{err}"),
        }
    }

    /// Mutable [`Creature::chain_by_name`]; panics the same way.
    pub fn chain_by_name_mut(&mut self, name: &str) -> &mut Chain {
        match self.find_chain_mut(name) {
            Ok(chain) => chain,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn distance_from_root(&self, point: Vec3) -> f32 {
        point.distance(self.root.position)
    }

    pub fn end_effector_distance_from_root(&self, name: &str) -> Result<f32, CreatureError> {
        self.find_chain(name)
            .map(|chain| self.distance_from_root(chain.end_effector()))
    }

    /// Runs the anchor handshake between two chains of this creature.
    pub fn try_unlock_and_toggle_anchor(
        &mut self,
        id: ChainId,
        partner: ChainId,
    ) -> Result<bool, CreatureError> {
        if id == partner {
            return Err(CreatureError::SelfPartner {
                name: self.chains[id.0].name.clone(),
            });
        }
        let (chain, other) = if id.0 < partner.0 {
            let (low, high) = self.chains.split_at_mut(partner.0);
            (&mut low[id.0], &mut high[0])
        } else {
            let (low, high) = self.chains.split_at_mut(id.0);
            (&mut high[0], &mut low[partner.0])
        };
        Ok(chain.try_unlock_and_toggle_anchor(other))
    }

    /// Re-places every chain on its mount and solves it, in declaration order, so a chain
    /// mounted on another sees its parent's pose from this frame.
    pub fn update(&mut self, dt: f32) -> Vec<SolveResult> {
        let root_frame = self.root_transform.frame();
        let mut results = Vec::with_capacity(self.chains.len());
        for i in 0..self.chains.len() {
            let placement = self.placement(&self.attachments[i]);
            let chain = &mut self.chains[i];
            if chain.root_mode == RootMode::Anchored {
                chain.attach = placement;
            }
            chain.root_frame = root_frame;
            results.push(chain.update(dt));
        }
        results
    }

    /// Reports every joint's world transform, chains in update order.
    pub fn render(&self, sink: &mut impl JointSink) {
        for (id, chain) in self.chains() {
            for (i, joint) in chain.joints().iter().enumerate() {
                if let Some(world) = chain.world_transform(i) {
                    sink.joint(id, i, &world, joint.length());
                }
            }
        }
    }

    pub(crate) fn placement(&self, attachment: &Attachment) -> Transform {
        match *attachment {
            Attachment::Root(offset) => self.root_transform * offset,
            Attachment::ChainEnd { parent, offset } => {
                let parent = &self.chains[parent.0];
                Transform::from_frame(parent.end_effector(), &parent.tip_frame()) * offset
            }
        }
    }
}
