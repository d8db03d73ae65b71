use std::collections::HashMap;

use crate::tree::CategoryNode;

/// Read-only index over a normalized category forest.
#[derive(Debug)]
pub struct CategoryTree<'a> {
    roots: &'a [CategoryNode],
    by_id: HashMap<&'a str, &'a CategoryNode>,
    parents: HashMap<&'a str, &'a str>,
}

impl<'a> CategoryTree<'a> {
    pub fn new(roots: &'a [CategoryNode]) -> Self {
        let mut by_id = HashMap::new();
        let mut parents = HashMap::new();
        let mut stack: Vec<&CategoryNode> = roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            by_id.insert(node.id.as_str(), node);
            for child in node.children().iter().rev() {
                parents.insert(child.id.as_str(), node.id.as_str());
                stack.push(child);
            }
        }
        Self {
            roots,
            by_id,
            parents,
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn roots(&self) -> &'a [CategoryNode] {
        self.roots
    }

    pub fn find(&self, id: &str) -> Option<&'a CategoryNode> {
        self.by_id.get(id).copied()
    }

    /// Parent inside this forest; roots have none even if `parent_id` is set.
    pub fn parent_of(&self, id: &str) -> Option<&'a CategoryNode> {
        let parent = self.parents.get(id)?;
        self.find(parent)
    }

    /// Root-first chain of ancestors, excluding `id` itself.
    pub fn ancestors(&self, id: &str) -> Vec<&'a CategoryNode> {
        let mut out = Vec::new();
        let mut cursor = id;
        while let Some(parent) = self.parents.get(cursor) {
            if let Some(node) = self.find(parent) {
                out.push(node);
            }
            cursor = *parent;
        }
        out.reverse();
        out
    }

    /// Pre-order listing, as rendered by indented list views.
    pub fn flatten(&self) -> Vec<&'a CategoryNode> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<&CategoryNode> = self.roots.iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children().iter().rev());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::CategoryTree;
    use crate::raw::RawCategory;
    use crate::tree::normalize;

    fn forest() -> Vec<crate::tree::CategoryNode> {
        let raw = vec![
            RawCategory::new(1, "site").with_children(vec![
                RawCategory::new(2, "building").with_children(vec![RawCategory::new(3, "room")]),
                RawCategory::new(4, "yard"),
            ]),
            RawCategory::new(5, "depot"),
        ];
        normalize(&raw, 1).unwrap()
    }

    #[test]
    fn find_and_ancestors() {
        let nodes = forest();
        let tree = CategoryTree::new(&nodes);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.find("3").map(|n| n.depth), Some(3));
        assert_eq!(tree.parent_of("3").map(|n| n.id.as_str()), Some("2"));
        assert!(tree.parent_of("1").is_none());
        let path: Vec<&str> = tree.ancestors("3").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(path, vec!["1", "2"]);
        assert!(tree.ancestors("missing").is_empty());
    }

    #[test]
    fn flatten_is_pre_order() {
        let nodes = forest();
        let tree = CategoryTree::new(&nodes);
        let ids: Vec<&str> = tree.flatten().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4", "5"]);
    }
}
