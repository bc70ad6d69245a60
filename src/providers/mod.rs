//! List service providers for cloudls

pub mod base;
pub mod catalog;
pub mod remote;

// Re-export commonly used items
pub use base::ListService;
pub use remote::HttpListService;
