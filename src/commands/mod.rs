//! Command implementations for cloudls

pub mod config;
pub mod list;
pub mod operations;

// Re-export command functions
pub use config::run as run_config;
pub use list::run as run_list;
pub use operations::run as run_operations;
