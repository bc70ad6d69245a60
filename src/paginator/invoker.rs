//! Pagination loop over a remote list operation
//!
//! The invoker issues one page request at a time, hands each page to a
//! consumer before asking for the next one, and stops on the first of:
//! - the service reporting no continuation token
//! - the item limit being reached
//! - single-page (manual) mode having fetched its page
//! - a failed call
//! - cancellation

use super::error::ListError;
use super::request::{ListRequest, PageRequest};
use crate::providers::ListService;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

/// Why a listing finished successfully
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The service reported no further pages
    EndOfList,
    /// The item limit was reached while more pages remained
    LimitReached,
    /// Manual mode fetched its single page
    SinglePage,
}

/// Outcome of one `invoke` call
///
/// Pages delivered before a failure or a cancellation stay delivered; the
/// counts here say how much the consumer received.
#[derive(Debug)]
pub enum FinalStatus {
    Completed {
        pages: u64,
        items: u64,
        reason: StopReason,
        resume_token: Option<String>,
    },
    Cancelled {
        pages: u64,
        items: u64,
        resume_token: Option<String>,
    },
    Failed {
        pages: u64,
        items: u64,
        resume_token: Option<String>,
        error: ListError,
    },
}

impl FinalStatus {
    #[allow(dead_code)]
    pub fn pages(&self) -> u64 {
        match self {
            Self::Completed { pages, .. }
            | Self::Cancelled { pages, .. }
            | Self::Failed { pages, .. } => *pages,
        }
    }

    #[allow(dead_code)]
    pub fn items(&self) -> u64 {
        match self {
            Self::Completed { items, .. }
            | Self::Cancelled { items, .. }
            | Self::Failed { items, .. } => *items,
        }
    }

    /// Token that continues the listing where this call stopped
    pub fn resume_token(&self) -> Option<&str> {
        match self {
            Self::Completed { resume_token, .. }
            | Self::Cancelled { resume_token, .. }
            | Self::Failed { resume_token, .. } => resume_token.as_deref(),
        }
    }

    #[allow(dead_code)]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    #[allow(dead_code)]
    pub fn error(&self) -> Option<&ListError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Cursor state for a single `invoke` call
#[derive(Debug)]
struct Cursor {
    token: Option<String>,
    page_size: Option<u32>,
    limit: Option<u64>,
    manual: bool,
    pages: u64,
    items: u64,
}

impl Cursor {
    fn start(request: &ListRequest, service_max: Option<u32>) -> Self {
        let limit = request.effective_limit();

        // With a limit and no hint, ask for the service maximum so the last
        // request can be shrunk to exactly what is left.
        let page_size = match (request.effective_page_size(), service_max) {
            (Some(hint), Some(max)) => Some(hint.min(max)),
            (Some(hint), None) => Some(hint),
            (None, max) if limit.is_some() => max,
            (None, _) => None,
        };

        Self {
            token: request.effective_starting_token().map(str::to_owned),
            page_size,
            limit,
            manual: request.manual,
            pages: 0,
            items: 0,
        }
    }

    fn remaining(&self) -> Option<u64> {
        self.limit.map(|limit| limit.saturating_sub(self.items))
    }

    fn requested_size(&self) -> Option<u32> {
        match self.remaining() {
            Some(remaining) => {
                let remaining = u32::try_from(remaining).unwrap_or(u32::MAX);
                Some(self.page_size.map_or(remaining, |size| size.min(remaining)))
            }
            None => self.page_size,
        }
    }

    fn next_page(&self, filters: &BTreeMap<String, String>) -> PageRequest {
        PageRequest {
            filters: filters.clone(),
            page_size: self.requested_size(),
            token: self.token.clone(),
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|limit| self.items >= limit)
    }

    fn completed(self, reason: StopReason) -> FinalStatus {
        FinalStatus::Completed {
            pages: self.pages,
            items: self.items,
            reason,
            resume_token: self.token,
        }
    }

    fn cancelled(self) -> FinalStatus {
        FinalStatus::Cancelled {
            pages: self.pages,
            items: self.items,
            resume_token: self.token,
        }
    }

    fn failed(self, error: ListError) -> FinalStatus {
        FinalStatus::Failed {
            pages: self.pages,
            items: self.items,
            resume_token: self.token,
            error,
        }
    }
}

/// Drives a [`ListService`] across all pages of one listing
pub struct PaginatedListInvoker<'a, S> {
    service: &'a S,
    cancel: CancellationToken,
}

impl<'a, S: ListService> PaginatedListInvoker<'a, S> {
    /// Create an invoker borrowing the given service
    pub fn new(service: &'a S) -> Self {
        Self {
            service,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between pages, or abort the in-flight call, once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run the listing, delivering each page to `consumer` as it arrives
    ///
    /// The consumer receives the page's items and whether the invoker
    /// expects this to be the final page.
    pub async fn invoke<F>(&self, request: ListRequest, mut consumer: F) -> FinalStatus
    where
        F: FnMut(Vec<S::Item>, bool),
    {
        let mut cursor = Cursor::start(&request, self.service.max_page_size());

        loop {
            if self.cancel.is_cancelled() {
                log::debug!("{}: cancelled after {} page(s)", self.service.name(), cursor.pages);
                return cursor.cancelled();
            }

            let page = cursor.next_page(&request.filters);
            log::debug!(
                "{}: requesting page {} (size {:?}, token {:?})",
                self.service.name(),
                cursor.pages + 1,
                page.page_size,
                page.token
            );

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    log::debug!("{}: in-flight request aborted", self.service.name());
                    return cursor.cancelled();
                }
                result = self.service.list_page(&page) => result,
            };

            let response = match result {
                Ok(response) => response,
                Err(error) => {
                    log::debug!(
                        "{}: page {} failed: {}",
                        self.service.name(),
                        cursor.pages + 1,
                        error
                    );
                    return cursor.failed(error);
                }
            };

            let next = response.continuation().map(str::to_owned);
            let count = response.items.len() as u64;

            cursor.pages += 1;
            cursor.items += count;

            let stop = match next {
                None => Some(StopReason::EndOfList),
                Some(_) if cursor.limit_reached() => Some(StopReason::LimitReached),
                Some(_) if cursor.manual => Some(StopReason::SinglePage),
                Some(_) => None,
            };

            let stalled = stop.is_none() && next.is_some() && next == page.token;

            consumer(response.items, stop.is_some() || stalled);

            if stalled {
                let token = next.unwrap_or_default();
                cursor.token = Some(token.clone());
                return cursor.failed(ListError::StalledCursor(token));
            }

            cursor.token = next;

            if let Some(reason) = stop {
                log::debug!(
                    "{}: done after {} page(s), {} item(s) ({:?})",
                    self.service.name(),
                    cursor.pages,
                    cursor.items,
                    reason
                );
                return cursor.completed(reason);
            }
        }
    }

    /// Run the listing and collect every delivered item
    #[allow(dead_code)]
    pub async fn collect(&self, request: ListRequest) -> (Vec<S::Item>, FinalStatus) {
        let mut all = Vec::new();
        let status = self.invoke(request, |items, _| all.extend(items)).await;
        (all, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paginator::ListResponse;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory listing of `0..total`, tokens are the next offset
    struct FakeService {
        total: u32,
        max_page_size: Option<u32>,
        fail_on_call: Option<usize>,
        hang_on_call: Option<usize>,
        calls: Mutex<Vec<PageRequest>>,
    }

    impl FakeService {
        fn new(total: u32, max_page_size: Option<u32>) -> Self {
            Self {
                total,
                max_page_size,
                fail_on_call: None,
                hang_on_call: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<PageRequest> {
            self.calls.lock().unwrap().clone()
        }

        fn requested_sizes(&self) -> Vec<Option<u32>> {
            self.calls().into_iter().map(|c| c.page_size).collect()
        }
    }

    impl ListService for FakeService {
        type Item = u32;

        async fn list_page(&self, page: &PageRequest) -> Result<ListResponse<u32>, ListError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(page.clone());
                calls.len()
            };

            if self.hang_on_call == Some(call) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail_on_call == Some(call) {
                return Err(ListError::Service {
                    status: 503,
                    code: "SlowDown".to_string(),
                    message: "Reduce your request rate".to_string(),
                });
            }

            let start: u32 = page.token.as_deref().map_or(0, |t| t.parse().unwrap());
            let natural = self.max_page_size.unwrap_or(1000);
            let size = page.page_size.map_or(natural, |s| s.min(natural));
            let end = (start + size).min(self.total);
            let next = (end < self.total).then(|| end.to_string());
            Ok(ListResponse::new((start..end).collect(), next))
        }

        fn max_page_size(&self) -> Option<u32> {
            self.max_page_size
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    /// Returns a fixed sequence of pages regardless of the request
    struct ScriptedService {
        pages: Mutex<Vec<ListResponse<u32>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedService {
        fn new(mut pages: Vec<ListResponse<u32>>) -> Self {
            pages.reverse();
            Self {
                pages: Mutex::new(pages),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl ListService for ScriptedService {
        type Item = u32;

        async fn list_page(&self, _page: &PageRequest) -> Result<ListResponse<u32>, ListError> {
            *self.calls.lock().unwrap() += 1;
            self.pages
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| ListError::Transport("no more scripted pages".to_string()))
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_unlimited_listing_follows_token_chain() {
        let service = FakeService::new(130, Some(50));
        let invoker = PaginatedListInvoker::new(&service);

        let mut pages = Vec::new();
        let status = invoker
            .invoke(ListRequest::new(), |items, is_last| pages.push((items.len(), is_last)))
            .await;

        assert_eq!(pages, vec![(50, false), (50, false), (30, true)]);
        assert_eq!(service.calls().len(), 3);
        assert!(matches!(
            status,
            FinalStatus::Completed {
                pages: 3,
                items: 130,
                reason: StopReason::EndOfList,
                resume_token: None,
            }
        ));
    }

    #[tokio::test]
    async fn test_item_limit_shrinks_final_request() {
        let service = FakeService::new(130, Some(50));
        let invoker = PaginatedListInvoker::new(&service);

        let (items, status) = invoker.collect(ListRequest::new().with_item_limit(75)).await;

        assert_eq!(items, (0..75).collect::<Vec<_>>());
        assert_eq!(service.requested_sizes(), vec![Some(50), Some(25)]);
        assert!(matches!(
            status,
            FinalStatus::Completed {
                pages: 2,
                items: 75,
                reason: StopReason::LimitReached,
                ..
            }
        ));
        assert_eq!(status.resume_token(), Some("75"));
    }

    #[tokio::test]
    async fn test_requested_size_never_exceeds_remaining_budget() {
        for limit in [1, 7, 49, 50, 51, 99, 100, 129, 130, 500] {
            let service = FakeService::new(130, Some(50));
            let invoker = PaginatedListInvoker::new(&service);

            let (items, _) = invoker
                .collect(ListRequest::new().with_page_size(20).with_item_limit(limit))
                .await;

            assert_eq!(items.len() as i64, limit.min(130), "limit {}", limit);

            let mut delivered = 0i64;
            for call in service.calls() {
                let size = call.page_size.unwrap() as i64;
                assert!(size <= 20);
                assert!(size <= limit - delivered, "limit {}", limit);
                delivered += size.min(130 - delivered);
            }
        }
    }

    #[tokio::test]
    async fn test_non_positive_limit_lists_everything() {
        for limit in [0, -1] {
            let service = FakeService::new(130, Some(50));
            let invoker = PaginatedListInvoker::new(&service);

            let (items, status) = invoker
                .collect(ListRequest::new().with_page_size(40).with_item_limit(limit))
                .await;

            assert_eq!(items.len(), 130);
            assert_eq!(service.requested_sizes(), vec![Some(40); 4]);
            assert!(status.is_completed());
        }
    }

    #[tokio::test]
    async fn test_page_size_hint_capped_by_service_maximum() {
        let service = FakeService::new(130, Some(50));
        let invoker = PaginatedListInvoker::new(&service);

        invoker.collect(ListRequest::new().with_page_size(500)).await;

        assert_eq!(service.requested_sizes(), vec![Some(50); 3]);
    }

    #[tokio::test]
    async fn test_repeated_invocations_are_identical() {
        let service = FakeService::new(130, Some(50));
        let invoker = PaginatedListInvoker::new(&service);
        let request = ListRequest::new().with_page_size(17).with_item_limit(90);

        let (first, _) = invoker.collect(request.clone()).await;
        let (second, _) = invoker.collect(request).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_single_page_mode_issues_one_call() {
        let service = FakeService::new(130, Some(50));
        let invoker = PaginatedListInvoker::new(&service);

        let mut pages = Vec::new();
        let status = invoker
            .invoke(
                ListRequest::new().with_starting_token("50").single_page(),
                |items, is_last| pages.push((items, is_last)),
            )
            .await;

        assert_eq!(service.calls().len(), 1);
        assert_eq!(service.calls()[0].token.as_deref(), Some("50"));
        assert_eq!(pages, vec![((50..100).collect::<Vec<_>>(), true)]);
        assert!(matches!(
            status,
            FinalStatus::Completed {
                reason: StopReason::SinglePage,
                ..
            }
        ));
        assert_eq!(status.resume_token(), Some("100"));
    }

    #[tokio::test]
    async fn test_single_page_mode_shrinks_page_to_limit() {
        let service = FakeService::new(130, Some(50));
        let invoker = PaginatedListInvoker::new(&service);

        let request = ListRequest::new().single_page().with_item_limit(10);
        let (items, status) = invoker.collect(request).await;

        assert_eq!(service.requested_sizes(), vec![Some(10)]);
        assert_eq!(items, (0..10).collect::<Vec<_>>());
        assert_eq!(status.pages(), 1);
        assert_eq!(status.resume_token(), Some("10"));
    }

    #[tokio::test]
    async fn test_limit_without_hint_or_service_maximum() {
        let service = FakeService::new(130, None);
        let invoker = PaginatedListInvoker::new(&service);

        let (items, status) = invoker.collect(ListRequest::new().with_item_limit(75)).await;

        assert_eq!(service.requested_sizes(), vec![Some(75)]);
        assert_eq!(items.len(), 75);
        assert!(matches!(
            status,
            FinalStatus::Completed {
                reason: StopReason::LimitReached,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_pages() {
        let mut service = FakeService::new(200, Some(50));
        service.fail_on_call = Some(3);
        let invoker = PaginatedListInvoker::new(&service);

        let mut delivered = Vec::new();
        let status = invoker
            .invoke(ListRequest::new(), |items, _| delivered.push(items.len()))
            .await;

        assert_eq!(delivered, vec![50, 50]);
        assert_eq!(service.calls().len(), 3);
        match status {
            FinalStatus::Failed {
                pages,
                items,
                resume_token,
                error,
            } => {
                assert_eq!(pages, 2);
                assert_eq!(items, 100);
                assert_eq!(resume_token.as_deref(), Some("100"));
                assert!(matches!(error, ListError::Service { status: 503, .. }));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failure_on_first_page() {
        let mut service = FakeService::new(10, None);
        service.fail_on_call = Some(1);
        let invoker = PaginatedListInvoker::new(&service);

        let mut delivered = 0;
        let status = invoker
            .invoke(ListRequest::new(), |_, _| delivered += 1)
            .await;

        assert_eq!(delivered, 0);
        assert_eq!(status.pages(), 0);
        assert!(status.error().is_some());
    }

    #[tokio::test]
    async fn test_cancel_between_pages() {
        let service = FakeService::new(200, Some(50));
        let cancel = CancellationToken::new();
        let invoker = PaginatedListInvoker::new(&service).with_cancellation(cancel.clone());

        let mut delivered = 0;
        let status = invoker
            .invoke(ListRequest::new(), |_, _| {
                delivered += 1;
                if delivered == 2 {
                    cancel.cancel();
                }
            })
            .await;

        assert_eq!(delivered, 2);
        assert_eq!(service.calls().len(), 2);
        assert!(matches!(
            status,
            FinalStatus::Cancelled {
                pages: 2,
                items: 100,
                ..
            }
        ));
        assert_eq!(status.resume_token(), Some("100"));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_call() {
        let mut service = FakeService::new(200, Some(50));
        service.hang_on_call = Some(2);
        let cancel = CancellationToken::new();
        let invoker = PaginatedListInvoker::new(&service).with_cancellation(cancel.clone());

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let status = invoker.invoke(ListRequest::new(), |_, _| {}).await;

        assert_eq!(service.calls().len(), 2);
        assert!(matches!(status, FinalStatus::Cancelled { pages: 1, .. }));
    }

    #[tokio::test]
    async fn test_empty_token_ends_listing() {
        let service = ScriptedService::new(vec![
            ListResponse::new(vec![1, 2], Some("a".to_string())),
            ListResponse::new(vec![3], Some(String::new())),
            ListResponse::last(vec![4]),
        ]);
        let invoker = PaginatedListInvoker::new(&service);

        let (items, status) = invoker.collect(ListRequest::new()).await;

        assert_eq!(items, vec![1, 2, 3]);
        assert_eq!(service.calls(), 2);
        assert!(status.is_completed());
    }

    #[tokio::test]
    async fn test_oversized_page_is_not_truncated() {
        let service = ScriptedService::new(vec![
            ListResponse::new(vec![1, 2, 3, 4, 5], Some("a".to_string())),
            ListResponse::last(vec![6]),
        ]);
        let invoker = PaginatedListInvoker::new(&service);

        let (items, status) = invoker
            .collect(ListRequest::new().with_page_size(2).with_item_limit(3))
            .await;

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(service.calls(), 1);
        assert_eq!(status.items(), 5);
    }

    #[tokio::test]
    async fn test_stalled_cursor_is_reported() {
        let service = ScriptedService::new(vec![
            ListResponse::new(vec![1], Some("a".to_string())),
            ListResponse::new(vec![2], Some("a".to_string())),
            ListResponse::new(vec![3], Some("a".to_string())),
        ]);
        let invoker = PaginatedListInvoker::new(&service);

        let mut last_flags = Vec::new();
        let status = invoker
            .invoke(ListRequest::new(), |_, is_last| last_flags.push(is_last))
            .await;

        assert_eq!(service.calls(), 2);
        assert_eq!(last_flags, vec![false, true]);
        assert!(matches!(status.error(), Some(ListError::StalledCursor(t)) if t == "a"));
        assert_eq!(status.items(), 2);
    }

    #[tokio::test]
    async fn test_token_chain_issues_n_plus_one_calls() {
        for n in 0..5usize {
            let mut pages: Vec<_> = (0..n)
                .map(|i| ListResponse::new(vec![i as u32], Some(format!("t{}", i))))
                .collect();
            pages.push(ListResponse::last(vec![99]));
            let service = ScriptedService::new(pages);
            let invoker = PaginatedListInvoker::new(&service);

            let (items, _) = invoker.collect(ListRequest::new()).await;

            assert_eq!(service.calls(), n + 1);
            assert_eq!(items.len(), n + 1);
        }
    }
}
