//! Request and response shapes for paginated listings

use std::collections::BTreeMap;

/// One logical "list everything" request as supplied by the front end
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    /// Service-specific filters, passed through untouched
    pub filters: BTreeMap<String, String>,

    /// Upper bound on items per call; the service may cap it lower
    pub page_size: Option<u32>,

    /// Token to resume an earlier listing from
    pub starting_token: Option<String>,

    /// Ceiling on items across all pages. Zero or negative means no limit.
    pub item_limit: Option<i64>,

    /// Fetch exactly one page and stop
    pub manual: bool,
}

impl ListRequest {
    /// Create an empty request (all pages, service default page size)
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter
    #[allow(dead_code)]
    pub fn with_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Set the page size hint
    #[allow(dead_code)]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Resume from a continuation token
    #[allow(dead_code)]
    pub fn with_starting_token(mut self, token: impl Into<String>) -> Self {
        self.starting_token = Some(token.into());
        self
    }

    /// Cap the total number of items
    #[allow(dead_code)]
    pub fn with_item_limit(mut self, limit: i64) -> Self {
        self.item_limit = Some(limit);
        self
    }

    /// Switch to single-page (manual) control
    #[allow(dead_code)]
    pub fn single_page(mut self) -> Self {
        self.manual = true;
        self
    }

    /// Item limit after normalization
    ///
    /// An explicit zero or a negative value is treated as "no limit", the
    /// same as leaving the limit unset.
    pub fn effective_limit(&self) -> Option<u64> {
        self.item_limit.filter(|limit| *limit > 0).map(|limit| limit as u64)
    }

    /// Page size hint after normalization (zero means no hint)
    pub fn effective_page_size(&self) -> Option<u32> {
        self.page_size.filter(|size| *size > 0)
    }

    /// Starting token, with an empty string treated as absent
    pub fn effective_starting_token(&self) -> Option<&str> {
        self.starting_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Arguments of a single remote list call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub filters: BTreeMap<String, String>,
    pub page_size: Option<u32>,
    pub token: Option<String>,
}

/// One page returned by the service
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> ListResponse<T> {
    #[allow(dead_code)]
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// A page with no continuation
    #[allow(dead_code)]
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Continuation token, or `None` at the end of the list
    ///
    /// Services are inconsistent about signalling the end with a missing
    /// token or an empty one; both mean the same here.
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }
}
