//! Normalization of backend category/device trees and flat lists.
//!
//! Raw payloads arrive in slightly different shapes depending on the endpoint
//! (numeric or string ids, several thumbnail field names, nested or flattened
//! trees). Everything here produces one canonical, depth-consistent shape.

pub mod error;
pub mod flat;
pub mod floors;
pub mod lookup;
pub mod raw;
pub mod tree;

pub use error::*;
pub use flat::*;
pub use floors::*;
pub use lookup::*;
pub use raw::*;
pub use tree::*;
