//! Hand-off to the mesh builder.
//!
//! The solver never draws anything. [`Creature::render`](crate::creature::Creature::render)
//! walks every joint and reports its world transform to a [`JointSink`]; turning that into
//! triangles is the sink's business.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::ik::ChainId;
use crate::math::Transform;

/// Receives one call per joint, chains in update order, joints root to tip.
pub trait JointSink {
    fn joint(&mut self, chain: ChainId, index: usize, world: &Transform, length: f32);
}

/// GPU-ready per-joint record: the bone's model matrix plus enough to pick a mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct JointInstance {
    /// Column-major; the bone runs along the matrix's local +X for `length` units.
    pub model: [[f32; 4]; 4],
    pub length: f32,
    pub chain: u32,
    pub index: u32,
    pub _padding: u32,
}

impl JointInstance {
    pub fn new(chain: ChainId, index: usize, world: &Transform, length: f32) -> Self {
        Self {
            model: world.to_matrix().to_cols_array_2d(),
            length,
            chain: chain.index() as u32,
            index: index as u32,
            _padding: 0,
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    pub fn start(&self) -> Vec3 {
        self.model_matrix().w_axis.truncate()
    }

    pub fn end(&self) -> Vec3 {
        self.model_matrix().transform_point3(Vec3::X * self.length)
    }
}

impl JointSink for Vec<JointInstance> {
    fn joint(&mut self, chain: ChainId, index: usize, world: &Transform, length: f32) {
        self.push(JointInstance::new(chain, index, world, length));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn instance_bytes_match_layout() {
        let world = Transform::new(Vec3::new(1.0, 2.0, 3.0), Quat::from_rotation_z(0.5));
        let instance = JointInstance::new(ChainId(4), 2, &world, 1.5);
        let bytes = bytemuck::bytes_of(&instance);
        assert_eq!(bytes.len(), 16 * 4 + 4 * 4);
        assert_eq!(instance.chain, 4);
        assert_eq!(instance.index, 2);
    }

    #[test]
    fn instance_spans_the_bone() {
        let world = Transform::new(Vec3::new(0.0, 0.0, 1.0), Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let instance = JointInstance::new(ChainId(0), 0, &world, 2.0);
        assert!((instance.start() - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
        assert!((instance.end() - Vec3::new(0.0, 2.0, 1.0)).length() < 1e-5);
    }
}
