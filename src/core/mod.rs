pub mod config;
pub mod error;

pub use config::EngagementConfig;
pub use error::{Result, SkirmishError};
