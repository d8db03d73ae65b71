//! Hierarchy description produced by asset loaders.
//!
//! The layout follows glTF: nodes are listed flat and reference children by
//! id, and the scene lists its root nodes. Nothing here is validated; the
//! scene crate rejects duplicate ids, dangling references and cycles when it
//! builds its index.

use serde::{Deserialize, Serialize};

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneNodeDesc {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

impl SceneNodeDesc {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            visible: true,
            children: Vec::new(),
        }
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyDescription {
    pub roots: Vec<String>,
    pub nodes: Vec<SceneNodeDesc>,
}

impl HierarchyDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, id: impl Into<String>) -> Self {
        self.roots.push(id.into());
        self
    }

    pub fn with_node(mut self, node: SceneNodeDesc) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::HierarchyDescription;

    #[test]
    fn parses_with_defaults() {
        let desc = HierarchyDescription::from_json_str(
            r#"{"roots": ["site"], "nodes": [
                {"id": "site", "children": ["b1"]},
                {"id": "b1", "name": "Building 1", "visible": false}
            ]}"#,
        )
        .unwrap();
        assert_eq!(desc.roots, vec!["site"]);
        assert!(desc.nodes[0].visible);
        assert!(!desc.nodes[1].visible);
        assert!(desc.nodes[1].children.is_empty());
        assert_eq!(desc.nodes[1].name.as_deref(), Some("Building 1"));
    }
}
