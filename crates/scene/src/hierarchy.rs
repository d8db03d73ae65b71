use std::collections::{HashMap, HashSet};

use foundation::ids::NodeId;
use streaming::protocol::HierarchyDescription;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("node {0} is listed more than once")]
    DuplicateNode(NodeId),
    #[error("node {parent} references unknown child {child}")]
    UnknownChild { parent: NodeId, child: NodeId },
    #[error("scene root {0} is not a known node")]
    UnknownRoot(NodeId),
    #[error("node {0} has more than one parent")]
    MultipleParents(NodeId),
    #[error("malformed hierarchy: node {0} is its own ancestor")]
    Cycle(NodeId),
}

/// One node of the loaded model, mirrored from the engine's scene graph.
///
/// `parent` is a lookup key into the owning [`ModelIndex`], not a reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTreeNode {
    pub id: NodeId,
    pub name: Option<String>,
    pub visible: bool,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Id-addressed mirror of a model hierarchy.
///
/// Built in one go from a [`HierarchyDescription`] and never edited
/// structurally afterwards; only node visibility changes.
#[derive(Debug, Clone, Default)]
pub struct ModelIndex {
    nodes: HashMap<NodeId, ModelTreeNode>,
    roots: Vec<NodeId>,
    preorder: Vec<NodeId>,
}

impl ModelIndex {
    pub fn build(desc: &HierarchyDescription) -> Result<Self, HierarchyError> {
        let mut nodes: HashMap<NodeId, ModelTreeNode> = HashMap::with_capacity(desc.nodes.len());
        for node in &desc.nodes {
            let id = NodeId::from(node.id.as_str());
            if nodes.contains_key(&id) {
                return Err(HierarchyError::DuplicateNode(id));
            }
            nodes.insert(
                id.clone(),
                ModelTreeNode {
                    id,
                    name: node.name.clone(),
                    visible: node.visible,
                    parent: None,
                    children: node.children.iter().map(|c| NodeId::from(c.as_str())).collect(),
                },
            );
        }

        // Link parents; each node may be claimed by one parent only.
        let mut parents: HashMap<NodeId, NodeId> = HashMap::new();
        for node in nodes.values() {
            for child in &node.children {
                if !nodes.contains_key(child) {
                    return Err(HierarchyError::UnknownChild {
                        parent: node.id.clone(),
                        child: child.clone(),
                    });
                }
                if *child == node.id {
                    return Err(HierarchyError::Cycle(child.clone()));
                }
                if parents.insert(child.clone(), node.id.clone()).is_some() {
                    return Err(HierarchyError::MultipleParents(child.clone()));
                }
            }
        }
        for (child, parent) in &parents {
            if let Some(node) = nodes.get_mut(child) {
                node.parent = Some(parent.clone());
            }
        }

        let mut roots = Vec::with_capacity(desc.roots.len());
        for root in &desc.roots {
            let root = NodeId::from(root.as_str());
            if !nodes.contains_key(&root) {
                return Err(HierarchyError::UnknownRoot(root));
            }
            if parents.contains_key(&root) {
                return Err(HierarchyError::MultipleParents(root));
            }
            if roots.contains(&root) {
                warn!(%root, "scene root listed twice");
                continue;
            }
            roots.push(root);
        }

        let preorder = walk_preorder(&nodes, &roots)?;
        if preorder.len() < nodes.len() {
            let reached: HashSet<&NodeId> = preorder.iter().collect();
            let unreached: Vec<NodeId> = nodes
                .keys()
                .filter(|id| !reached.contains(id))
                .cloned()
                .collect();
            if let Some(id) = find_parent_loop(&parents, &unreached) {
                return Err(HierarchyError::Cycle(id));
            }
            warn!(
                count = unreached.len(),
                "ignoring nodes not attached to any scene root"
            );
            for id in &unreached {
                nodes.remove(id);
            }
        }

        Ok(Self {
            nodes,
            roots,
            preorder,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&ModelTreeNode> {
        self.nodes.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut ModelTreeNode> {
        self.nodes.get_mut(id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// All node ids, parents before children, roots in scene order.
    pub fn preorder(&self) -> &[NodeId] {
        &self.preorder
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ModelTreeNode> + '_ {
        self.preorder.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn children_of(&self, id: &str) -> &[NodeId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: &str) -> Option<&NodeId> {
        self.nodes.get(id)?.parent.as_ref()
    }

    /// Root-first chain of ancestors, excluding `id`.
    pub fn ancestors(&self, id: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.parent_of(id);
        while let Some(parent) = cursor {
            out.push(parent.clone());
            cursor = self.parent_of(parent.as_str());
        }
        out.reverse();
        out
    }

    /// `id` and all of its descendants in pre-order; empty for unknown ids.
    pub fn subtree(&self, id: &str) -> Vec<NodeId> {
        let Some(start) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut stack = vec![&start.id];
        while let Some(id) = stack.pop() {
            out.push(id.clone());
            stack.extend(self.children_of(id.as_str()).iter().rev());
        }
        out
    }
}

fn walk_preorder(
    nodes: &HashMap<NodeId, ModelTreeNode>,
    roots: &[NodeId],
) -> Result<Vec<NodeId>, HierarchyError> {
    let mut visited: HashSet<&NodeId> = HashSet::with_capacity(nodes.len());
    let mut preorder = Vec::with_capacity(nodes.len());
    let mut stack: Vec<&NodeId> = roots.iter().rev().collect();
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            return Err(HierarchyError::Cycle(id.clone()));
        }
        preorder.push(id.clone());
        if let Some(node) = nodes.get(id) {
            stack.extend(node.children.iter().rev());
        }
    }
    Ok(preorder)
}

/// Follow parent links upwards from each unreached node. Reaching a node
/// without a parent means a detached subtree; revisiting a node means a loop.
fn find_parent_loop(parents: &HashMap<NodeId, NodeId>, unreached: &[NodeId]) -> Option<NodeId> {
    for start in unreached {
        let mut seen: HashSet<&NodeId> = HashSet::new();
        let mut cursor = start;
        while let Some(parent) = parents.get(cursor) {
            if !seen.insert(cursor) {
                return Some(cursor.clone());
            }
            cursor = parent;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{HierarchyError, ModelIndex};
    use foundation::ids::NodeId;
    use streaming::protocol::{HierarchyDescription, SceneNodeDesc};

    fn station() -> HierarchyDescription {
        HierarchyDescription::new()
            .with_root("station")
            .with_node(SceneNodeDesc::new("station").with_children(["concourse", "platform"]))
            .with_node(SceneNodeDesc::new("concourse").with_children(["gate-a", "gate-b"]))
            .with_node(SceneNodeDesc::new("gate-a"))
            .with_node(SceneNodeDesc::new("gate-b").hidden())
            .with_node(SceneNodeDesc::new("platform"))
    }

    fn ids(v: &[NodeId]) -> Vec<&str> {
        v.iter().map(NodeId::as_str).collect()
    }

    #[test]
    fn builds_parent_links_and_preorder() {
        let index = ModelIndex::build(&station()).unwrap();
        assert_eq!(index.len(), 5);
        assert_eq!(
            ids(index.preorder()),
            vec!["station", "concourse", "gate-a", "gate-b", "platform"]
        );
        assert_eq!(index.parent_of("gate-a").map(NodeId::as_str), Some("concourse"));
        assert_eq!(ids(&index.ancestors("gate-b")), vec!["station", "concourse"]);
        assert_eq!(ids(&index.subtree("concourse")), vec!["concourse", "gate-a", "gate-b"]);
        assert!(!index.get("gate-b").unwrap().visible);
        assert!(index.subtree("nope").is_empty());
    }

    #[test]
    fn rejects_structural_errors() {
        let dup = station().with_node(SceneNodeDesc::new("platform"));
        assert_eq!(
            ModelIndex::build(&dup).unwrap_err(),
            HierarchyError::DuplicateNode("platform".into())
        );

        let dangling = HierarchyDescription::new()
            .with_root("a")
            .with_node(SceneNodeDesc::new("a").with_children(["ghost"]));
        assert!(matches!(
            ModelIndex::build(&dangling),
            Err(HierarchyError::UnknownChild { .. })
        ));

        let shared = HierarchyDescription::new()
            .with_root("a")
            .with_node(SceneNodeDesc::new("a").with_children(["b", "c"]))
            .with_node(SceneNodeDesc::new("b").with_children(["c"]))
            .with_node(SceneNodeDesc::new("c"));
        assert_eq!(
            ModelIndex::build(&shared).unwrap_err(),
            HierarchyError::MultipleParents("c".into())
        );

        let bad_root = HierarchyDescription::new().with_root("x");
        assert_eq!(
            ModelIndex::build(&bad_root).unwrap_err(),
            HierarchyError::UnknownRoot("x".into())
        );
    }

    #[test]
    fn detects_parent_loops() {
        let looped = HierarchyDescription::new()
            .with_root("root")
            .with_node(SceneNodeDesc::new("root"))
            .with_node(SceneNodeDesc::new("a").with_children(["b"]))
            .with_node(SceneNodeDesc::new("b").with_children(["a"]));
        assert!(matches!(
            ModelIndex::build(&looped),
            Err(HierarchyError::Cycle(_))
        ));

        let self_loop = HierarchyDescription::new()
            .with_root("a")
            .with_node(SceneNodeDesc::new("a").with_children(["a"]));
        assert_eq!(
            ModelIndex::build(&self_loop).unwrap_err(),
            HierarchyError::Cycle("a".into())
        );
    }

    #[test]
    fn detached_subtrees_are_dropped() {
        let desc = station()
            .with_node(SceneNodeDesc::new("spare").with_children(["spare-part"]))
            .with_node(SceneNodeDesc::new("spare-part"));
        let index = ModelIndex::build(&desc).unwrap();
        assert_eq!(index.len(), 5);
        assert!(!index.contains("spare"));
        assert!(!index.contains("spare-part"));
    }
}
