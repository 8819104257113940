use std::collections::HashMap;

use super::{Attachment, Creature};
use crate::error::CreatureError;
use crate::ik::{ChainBuilder, ChainId, Joint};
use crate::math::Transform;

enum Mount {
    Root,
    ChainEnd(String),
}

struct PendingChain {
    name: String,
    mount: Mount,
    offset: Transform,
    chain: ChainBuilder,
}

/// Declares a creature's topology. Nothing is validated until [`CreatureBuilder::build`].
///
/// A chain mounted on another chain's end must be declared after it; declaration order is
/// also update order.
pub struct CreatureBuilder {
    root: Transform,
    pending: Vec<PendingChain>,
}

impl CreatureBuilder {
    pub fn new(root: Transform) -> Self {
        Self {
            root,
            pending: Vec::new(),
        }
    }

    /// Mounts a chain on the root body at `offset` (root-local). Any attachment set on
    /// `chain` itself is replaced.
    pub fn chain(mut self, name: impl Into<String>, offset: Transform, chain: ChainBuilder) -> Self {
        self.pending.push(PendingChain {
            name: name.into(),
            mount: Mount::Root,
            offset,
            chain,
        });
        self
    }

    /// Mounts a chain on the end effector of `parent`, `offset` expressed in the parent's tip frame.
    pub fn chain_on(
        mut self,
        name: impl Into<String>,
        parent: impl Into<String>,
        offset: Transform,
        chain: ChainBuilder,
    ) -> Self {
        self.pending.push(PendingChain {
            name: name.into(),
            mount: Mount::ChainEnd(parent.into()),
            offset,
            chain,
        });
        self
    }

    pub fn build(self) -> Result<Creature, CreatureError> {
        self.validate().inspect_err(|err| log::warn!("creature rejected: {err}"))?;

        let mut root = Joint::new(0.0);
        root.position = self.root.position;
        root.frame = self.root.frame();

        let mut creature = Creature {
            root,
            root_transform: self.root,
            chains: Vec::with_capacity(self.pending.len()),
            attachments: Vec::with_capacity(self.pending.len()),
            index: HashMap::new(),
        };

        for entry in self.pending {
            let id = ChainId(creature.chains.len());
            let attachment = match entry.mount {
                Mount::Root => Attachment::Root(entry.offset),
                Mount::ChainEnd(parent) => Attachment::ChainEnd {
                    parent: creature.index[&parent],
                    offset: entry.offset,
                },
            };

            let placement = creature.placement(&attachment);
            let mut chain = entry.chain.attach(placement).build();
            chain.name = entry.name.clone();
            chain.root_frame = creature.root_transform.frame();
            if let Attachment::ChainEnd { parent, .. } = attachment {
                chain.parent = Some(parent);
                creature.chains[parent.0].children.push(id);
            }

            log::debug!(
                "chain '{}' built: {} joints, length {:.3}",
                entry.name,
                chain.joint_count(),
                chain.total_length()
            );
            creature.chains.push(chain);
            creature.attachments.push(attachment);
            creature.index.insert(entry.name, id);
        }

        Ok(creature)
    }

    fn validate(&self) -> Result<(), CreatureError> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.pending.len());
        for entry in &self.pending {
            if seen.contains(&entry.name.as_str()) {
                return Err(CreatureError::DuplicateChain {
                    name: entry.name.clone(),
                });
            }
            if let Mount::ChainEnd(parent) = &entry.mount {
                if !seen.contains(&parent.as_str()) {
                    return Err(CreatureError::UnknownParentChain {
                        chain: entry.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }

            let mut lengths = entry.chain.joint_lengths().peekable();
            if lengths.peek().is_none() {
                return Err(CreatureError::EmptyChain {
                    name: entry.name.clone(),
                });
            }
            if let Some((index, length)) = lengths
                .enumerate()
                .find(|(_, length)| !length.is_finite() || *length <= 0.0)
            {
                return Err(CreatureError::InvalidLength {
                    chain: entry.name.clone(),
                    index,
                    length,
                });
            }
            seen.push(&entry.name);
        }
        Ok(())
    }
}
