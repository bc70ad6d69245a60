//! Automatic pagination for remote list operations

pub mod error;
pub mod invoker;
pub mod request;

// Re-export commonly used items
pub use error::ListError;
pub use invoker::{FinalStatus, PaginatedListInvoker, StopReason};
pub use request::{ListRequest, ListResponse, PageRequest};
