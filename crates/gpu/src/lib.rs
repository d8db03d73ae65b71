pub mod engine;
pub mod path_layer;
pub mod path_point;
pub mod recording;

pub use engine::*;
pub use path_layer::*;
pub use path_point::*;
pub use recording::*;
