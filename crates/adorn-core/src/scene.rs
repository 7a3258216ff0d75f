//! Rendering seam.
//!
//! The engine decides where accessory content sits, never how it is
//! drawn. Hosts hand in a [`SceneRenderer`]; the engine drives it with
//! node create/content/transform/remove calls and nothing else.

use crate::asset::Renderable;
use crate::types::Vec3;

/// Opaque scene-node token, minted by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u64);

impl NodeHandle {
    pub const fn new(raw: u64) -> Self {
        NodeHandle(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Full placement for a scene node. Rotation is Euler XYZ in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePlacement {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

/// Scene mutations the engine performs. Implementations map handles to
/// whatever their scene graph uses for nodes.
pub trait SceneRenderer: Send {
    fn create_node(&mut self) -> NodeHandle;
    fn set_content(&mut self, node: NodeHandle, content: &Renderable);
    fn set_transform(&mut self, node: NodeHandle, placement: &NodePlacement);
    fn remove_node(&mut self, node: NodeHandle);
}
