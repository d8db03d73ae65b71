pub mod arena;
pub mod color;
pub mod handles;
pub mod ids;
pub mod math;

// Foundation crate: small, well-tested primitives only.
pub use arena::*;
pub use color::*;
pub use handles::*;
pub use ids::*;
