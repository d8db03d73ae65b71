pub mod config;
pub mod expansion;
pub mod hierarchy;
pub mod manager;

pub use config::*;
pub use expansion::*;
pub use hierarchy::*;
pub use manager::*;
