//! Seam to the rendering engine.
//!
//! The engine itself (scene graph, GPU upload, draw loop) lives outside this
//! workspace. Everything here talks to it through [`RenderEngine`] and the
//! opaque handles it hands out.

use foundation::Rgb;
use foundation::handles::Handle;
use foundation::ids::NodeId;
use foundation::math::Vec3;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub Handle);

/// A loaded model's root in the engine's scene.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ModelHandle(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeometryDesc {
    Cylinder { radius: f64, height: f64 },
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MaterialDesc {
    Basic { color: Rgb },
}

pub trait RenderEngine {
    fn attach_model(&mut self, model: ModelHandle);
    fn detach_model(&mut self, model: ModelHandle);

    /// Per-node visibility; unknown nodes are ignored by the engine.
    fn set_node_visible(&mut self, node: &NodeId, visible: bool);
    fn remove_node(&mut self, node: &NodeId);

    fn create_geometry(&mut self, desc: GeometryDesc) -> GeometryHandle;
    fn create_material(&mut self, desc: MaterialDesc) -> MaterialHandle;
    fn create_mesh(
        &mut self,
        geometry: GeometryHandle,
        material: MaterialHandle,
        position: Vec3,
    ) -> MeshHandle;
    fn set_mesh_position(&mut self, mesh: MeshHandle, position: Vec3);

    fn dispose_mesh(&mut self, mesh: MeshHandle);
    fn dispose_geometry(&mut self, geometry: GeometryHandle);
    fn dispose_material(&mut self, material: MaterialHandle);
}
