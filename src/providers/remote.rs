//! HTTP list service implementation

use super::base::ListService;
use super::catalog::Operation;
use crate::paginator::{ListError, ListResponse, PageRequest};
use crate::utils::HttpClient;
use serde_json::Value;

/// Query parameter carrying the page size
pub const PAGE_SIZE_PARAM: &str = "max-items";

/// Query parameter carrying the continuation token
pub const TOKEN_PARAM: &str = "next-token";

/// Response field holding the continuation token
pub const NEXT_TOKEN_FIELD: &str = "NextToken";

/// One catalog operation served over HTTP
///
/// Borrows the client; the connection pool outlives any single listing.
pub struct HttpListService<'a> {
    http: &'a HttpClient,
    operation: &'static Operation,
}

impl<'a> HttpListService<'a> {
    pub fn new(http: &'a HttpClient, operation: &'static Operation) -> Self {
        Self { http, operation }
    }

    /// Query parameters for one page
    fn query_for(
        &self,
        page: &PageRequest,
        mut query: Vec<(String, String)>,
    ) -> Vec<(String, String)> {
        if let Some(size) = page.page_size {
            query.push((PAGE_SIZE_PARAM.to_string(), size.to_string()));
        }
        if let Some(ref token) = page.token {
            query.push((TOKEN_PARAM.to_string(), token.clone()));
        }
        query
    }
}

impl ListService for HttpListService<'_> {
    type Item = Value;

    async fn list_page(&self, page: &PageRequest) -> Result<ListResponse<Value>, ListError> {
        let (segments, query) = self.operation.resolve(&page.filters)?;
        let query = self.query_for(page, query);

        let body = self.http.get_json(&segments, &query).await?;
        parse_page(self.operation, body)
    }

    fn max_page_size(&self) -> Option<u32> {
        Some(self.operation.max_page_size)
    }

    fn name(&self) -> &str {
        self.operation.name
    }
}

/// Decode one page of an operation's response body
///
/// A missing records field is an empty page; a missing, null or empty
/// token is the end of the list.
pub fn parse_page(operation: &Operation, body: Value) -> Result<ListResponse<Value>, ListError> {
    let Value::Object(mut fields) = body else {
        return Err(ListError::Transport(format!(
            "{}: expected a JSON object in the response",
            operation.name
        )));
    };

    let items = match fields.remove(operation.records_key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(ListError::Transport(format!(
                "{}: '{}' is not an array",
                operation.name, operation.records_key
            )))
        }
    };

    let next_token = match fields.remove(NEXT_TOKEN_FIELD) {
        None | Some(Value::Null) => None,
        Some(Value::String(token)) => Some(token),
        Some(_) => {
            return Err(ListError::Transport(format!(
                "{}: '{}' is not a string",
                operation.name, NEXT_TOKEN_FIELD
            )))
        }
    };

    Ok(ListResponse::new(items, next_token))
}
