//! finmate-config
//!
//! Server configuration model and its JSON persistence.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{resolve_home_dir, Config, ServerSettings, HOME_ENV};
