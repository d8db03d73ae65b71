pub mod cancel;
pub mod fs_loader;
pub mod loader;
pub mod protocol;
pub mod request;
pub mod tracker;

pub use cancel::*;
pub use fs_loader::*;
pub use loader::*;
pub use protocol::*;
pub use request::*;
pub use tracker::*;
