pub mod config;
pub mod error;
pub mod uav;

pub use config::*;
pub use error::*;
pub use uav::*;
