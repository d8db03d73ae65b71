use foundation::ids::NodeId;

/// The single expanded node of a hierarchy menu, if any.
///
/// Holding one value instead of a flag per node makes "expanding one item
/// collapses the others" hold by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedPath(Option<NodeId>);

impl ExpandedPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&NodeId> {
        self.0.as_ref()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.0.as_ref().is_some_and(|current| current.as_str() == id)
    }

    /// Expand `id`. Returns the node that was implicitly collapsed, if any.
    pub fn expand(&mut self, id: NodeId) -> Option<NodeId> {
        match self.0.replace(id) {
            Some(prev) if Some(&prev) == self.0.as_ref() => None,
            prev => prev,
        }
    }

    /// Collapse `id` if it is the expanded node.
    pub fn collapse(&mut self, id: &str) -> bool {
        if !self.is_expanded(id) {
            return false;
        }
        self.0 = None;
        true
    }

    pub fn clear(&mut self) -> Option<NodeId> {
        self.0.take()
    }
}
