//! Core modules for cloudls

pub mod config;
pub mod deprecation;
pub mod paths;
pub mod preferences;

// Re-export commonly used items
pub use config::{ClientSettings, Config, Overrides};
pub use deprecation::Diagnostics;
pub use paths::CloudlsPaths;
pub use preferences::Preferences;
