#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    /// A category is its own transitive parent.
    #[error("malformed hierarchy: category {id} is its own ancestor")]
    MalformedHierarchy { id: String },
    #[error("category {id} is nested deeper than {max} levels")]
    DepthLimitExceeded { id: String, max: usize },
}
