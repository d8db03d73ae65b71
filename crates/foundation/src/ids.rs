use std::borrow::Borrow;

/// Identifier of a node inside a loaded model, as named by the rendering engine.
///
/// Ids are opaque strings; ordering is lexicographic and only used to keep
/// maps deterministic.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        NodeId(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        NodeId(value)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::NodeId;
    use std::collections::BTreeMap;

    #[test]
    fn borrows_as_str_for_map_lookups() {
        let mut map = BTreeMap::new();
        map.insert(NodeId::from("floor-1"), 1);
        assert_eq!(map.get("floor-1"), Some(&1));
        assert_eq!(NodeId::new("a").as_str(), "a");
    }
}
