//! Base trait for list services

use crate::paginator::{ListError, ListResponse, PageRequest};

/// A remote "list" operation that can be called one page at a time
pub trait ListService {
    /// Record type of the listing
    type Item;

    /// Execute a single list call
    ///
    /// # Arguments
    /// * `page` - Filters, page size and continuation token for this call
    ///
    /// # Returns
    /// The page's items and the token for the next page, if any
    async fn list_page(&self, page: &PageRequest) -> Result<ListResponse<Self::Item>, ListError>;

    /// Largest page the service will return, when known
    fn max_page_size(&self) -> Option<u32> {
        None
    }

    /// Get the service name (used in log lines)
    fn name(&self) -> &str;
}
