use std::collections::BTreeMap;

use foundation::arena::SlotArena;
use foundation::ids::NodeId;
use foundation::math::Vec3;
use tracing::warn;

use crate::engine::{
    GeometryDesc, GeometryHandle, MaterialDesc, MaterialHandle, MeshHandle, ModelHandle,
    RenderEngine,
};

/// One call received by a [`RecordingEngine`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    AttachModel(ModelHandle),
    DetachModel(ModelHandle),
    SetNodeVisible { node: NodeId, visible: bool },
    RemoveNode(NodeId),
    CreateGeometry(GeometryHandle),
    CreateMaterial(MaterialHandle),
    CreateMesh(MeshHandle),
    SetMeshPosition { mesh: MeshHandle, position: Vec3 },
    DisposeMesh(MeshHandle),
    DisposeGeometry(GeometryHandle),
    DisposeMaterial(MaterialHandle),
}

#[derive(Debug, Copy, Clone)]
struct Mesh {
    position: Vec3,
}

/// Headless engine that tracks live resources and records every call.
///
/// Used by the CLI and by tests. Disposing a handle that is not live (double
/// free or never allocated) is counted in [`RecordingEngine::invalid_disposals`].
#[derive(Debug)]
pub struct RecordingEngine {
    container: String,
    geometries: SlotArena<GeometryDesc>,
    materials: SlotArena<MaterialDesc>,
    meshes: SlotArena<Mesh>,
    attached: Vec<ModelHandle>,
    node_visibility: BTreeMap<NodeId, bool>,
    calls: Vec<EngineCall>,
    disposals: usize,
    invalid_disposals: usize,
}

impl RecordingEngine {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            geometries: SlotArena::new(),
            materials: SlotArena::new(),
            meshes: SlotArena::new(),
            attached: Vec::new(),
            node_visibility: BTreeMap::new(),
            calls: Vec::new(),
            disposals: 0,
            invalid_disposals: 0,
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    pub fn drain_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn attached_models(&self) -> &[ModelHandle] {
        &self.attached
    }

    /// Last visibility forwarded for `node`.
    pub fn node_visible(&self, node: &str) -> Option<bool> {
        self.node_visibility.get(node).copied()
    }

    pub fn live_geometries(&self) -> usize {
        self.geometries.len()
    }

    pub fn live_materials(&self) -> usize {
        self.materials.len()
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    pub fn mesh_position(&self, mesh: MeshHandle) -> Option<Vec3> {
        self.meshes.get(mesh.0).map(|m| m.position)
    }

    pub fn disposals(&self) -> usize {
        self.disposals
    }

    pub fn invalid_disposals(&self) -> usize {
        self.invalid_disposals
    }

    fn count_disposal(&mut self, released: bool, what: &'static str) {
        if released {
            self.disposals += 1;
        } else {
            self.invalid_disposals += 1;
            warn!(what, "dispose of a handle that is not live");
        }
    }
}

impl RenderEngine for RecordingEngine {
    fn attach_model(&mut self, model: ModelHandle) {
        self.attached.push(model);
        self.calls.push(EngineCall::AttachModel(model));
    }

    fn detach_model(&mut self, model: ModelHandle) {
        self.attached.retain(|m| *m != model);
        self.node_visibility.clear();
        self.calls.push(EngineCall::DetachModel(model));
    }

    fn set_node_visible(&mut self, node: &NodeId, visible: bool) {
        self.node_visibility.insert(node.clone(), visible);
        self.calls.push(EngineCall::SetNodeVisible {
            node: node.clone(),
            visible,
        });
    }

    fn remove_node(&mut self, node: &NodeId) {
        self.node_visibility.remove(node);
        self.calls.push(EngineCall::RemoveNode(node.clone()));
    }

    fn create_geometry(&mut self, desc: GeometryDesc) -> GeometryHandle {
        let handle = GeometryHandle(self.geometries.insert(desc));
        self.calls.push(EngineCall::CreateGeometry(handle));
        handle
    }

    fn create_material(&mut self, desc: MaterialDesc) -> MaterialHandle {
        let handle = MaterialHandle(self.materials.insert(desc));
        self.calls.push(EngineCall::CreateMaterial(handle));
        handle
    }

    fn create_mesh(
        &mut self,
        _geometry: GeometryHandle,
        _material: MaterialHandle,
        position: Vec3,
    ) -> MeshHandle {
        let handle = MeshHandle(self.meshes.insert(Mesh { position }));
        self.calls.push(EngineCall::CreateMesh(handle));
        handle
    }

    fn set_mesh_position(&mut self, mesh: MeshHandle, position: Vec3) {
        if let Some(m) = self.meshes.get_mut(mesh.0) {
            m.position = position;
        }
        self.calls.push(EngineCall::SetMeshPosition { mesh, position });
    }

    fn dispose_mesh(&mut self, mesh: MeshHandle) {
        let released = self.meshes.remove(mesh.0).is_some();
        self.count_disposal(released, "mesh");
        self.calls.push(EngineCall::DisposeMesh(mesh));
    }

    fn dispose_geometry(&mut self, geometry: GeometryHandle) {
        let released = self.geometries.remove(geometry.0).is_some();
        self.count_disposal(released, "geometry");
        self.calls.push(EngineCall::DisposeGeometry(geometry));
    }

    fn dispose_material(&mut self, material: MaterialHandle) {
        let released = self.materials.remove(material.0).is_some();
        self.count_disposal(released, "material");
        self.calls.push(EngineCall::DisposeMaterial(material));
    }
}

#[cfg(test)]
mod tests {
    use super::{EngineCall, RecordingEngine};
    use crate::engine::{GeometryDesc, ModelHandle, RenderEngine};
    use foundation::handles::Handle;
    use foundation::ids::NodeId;

    #[test]
    fn tracks_visibility_and_models() {
        let mut engine = RecordingEngine::new("#canvas");
        let model = ModelHandle(Handle::new(0, 0));
        engine.attach_model(model);
        engine.set_node_visible(&NodeId::from("door"), false);
        assert_eq!(engine.node_visible("door"), Some(false));
        assert_eq!(engine.attached_models(), &[model]);

        engine.detach_model(model);
        assert!(engine.attached_models().is_empty());
        assert_eq!(engine.node_visible("door"), None);
        assert_eq!(engine.calls().len(), 3);
        assert_eq!(engine.container(), "#canvas");
    }

    #[test]
    fn double_dispose_is_counted_as_invalid() {
        let mut engine = RecordingEngine::new("#canvas");
        let g = engine.create_geometry(GeometryDesc::Cylinder {
            radius: 1.0,
            height: 1.0,
        });
        engine.dispose_geometry(g);
        engine.dispose_geometry(g);
        assert_eq!(engine.disposals(), 1);
        assert_eq!(engine.invalid_disposals(), 1);
        assert!(matches!(engine.calls()[0], EngineCall::CreateGeometry(_)));
    }
}
