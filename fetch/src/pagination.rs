//! Page/limit bookkeeping on top of a request envelope.
//!
//! Navigation state comes only from the most recent successful response;
//! `has_next`, `has_prev` and `total_pages` are never recomputed locally,
//! even when the backend reports something inconsistent.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use payloads::Paginated;
use tokio::sync::watch;

use crate::envelope::{EnvelopeOptions, OpResult, RequestEnvelope};
use crate::state::{Outcome, RequestState};

/// The argument every paginated operation receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<X> {
    pub page: u32,
    pub limit: u32,
    pub extra: X,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationState {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            total: 0,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

/// The page currently on screen, kept apart from the envelope so a failed
/// load leaves it visible.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub pagination: PaginationState,
}

pub struct PaginationController<T, X> {
    envelope: RequestEnvelope<PageRequest<X>, Paginated<T>>,
    view: Arc<Mutex<PageView<T>>>,
}

impl<T, X> PaginationController<T, X>
where
    T: Clone + Send + Sync + 'static,
    X: Send + 'static,
{
    pub fn new<F, Fut>(limit: u32, operation: F) -> Self
    where
        F: Fn(PageRequest<X>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<Paginated<T>>> + Send + 'static,
    {
        Self::with_options(limit, operation, EnvelopeOptions::default())
    }

    pub fn with_options<F, Fut>(
        limit: u32,
        operation: F,
        options: EnvelopeOptions<Paginated<T>>,
    ) -> Self
    where
        F: Fn(PageRequest<X>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = OpResult<Paginated<T>>> + Send + 'static,
    {
        Self {
            envelope: RequestEnvelope::with_options(operation, options),
            view: Arc::new(Mutex::new(PageView {
                items: Vec::new(),
                pagination: PaginationState::new(limit.max(1)),
            })),
        }
    }

    /// Load `page` at the current limit. Rejecting `page < 1` is up to the
    /// caller. On success the pagination state is replaced wholesale from
    /// the response; on failure it is left untouched.
    pub async fn load_page(
        &self,
        page: u32,
        extra: X,
    ) -> Outcome<Paginated<T>> {
        let limit = self.view.lock().pagination.limit;
        let view = self.view.clone();
        tracing::debug!(page, limit, "Loading page");
        self.envelope
            .execute_with(PageRequest { page, limit, extra }, move |response| {
                let mut view = view.lock();
                view.pagination = PaginationState {
                    page,
                    limit,
                    total: response.total,
                    total_pages: response.total_pages,
                    has_next: response.has_next,
                    has_prev: response.has_prev,
                };
                view.items = response.data.clone();
            })
            .await
    }

    /// `None` when there is no next page; nothing is requested.
    pub async fn next_page(&self, extra: X) -> Option<Outcome<Paginated<T>>> {
        let pagination = self.pagination();
        if !pagination.has_next {
            return None;
        }
        let next = pagination.page.checked_add(1)?;
        Some(self.load_page(next, extra).await)
    }

    /// `None` when there is no previous page; nothing is requested.
    pub async fn prev_page(&self, extra: X) -> Option<Outcome<Paginated<T>>> {
        let pagination = self.pagination();
        if !pagination.has_prev {
            return None;
        }
        Some(self.load_page(pagination.page.saturating_sub(1), extra).await)
    }

    /// `None` when `page` is outside `1..=total_pages`.
    pub async fn go_to_page(
        &self,
        page: u32,
        extra: X,
    ) -> Option<Outcome<Paginated<T>>> {
        let pagination = self.pagination();
        if page < 1 || page > pagination.total_pages {
            return None;
        }
        Some(self.load_page(page, extra).await)
    }

    /// Change the page size and go back to page 1. A load still in flight
    /// was sized for the old limit and is discarded. Does not reload; call
    /// `load_page(1, ..)` for that.
    pub fn set_limit(&self, limit: u32) {
        if limit == 0 {
            tracing::warn!("Ignoring page size of zero");
            return;
        }
        self.envelope.supersede();
        let mut view = self.view.lock();
        view.pagination.limit = limit;
        view.pagination.page = 1;
    }

    pub fn pagination(&self) -> PaginationState {
        self.view.lock().pagination
    }

    pub fn items(&self) -> Vec<T> {
        self.view.lock().items.clone()
    }

    pub fn view(&self) -> PageView<T> {
        self.view.lock().clone()
    }

    /// Loading/error flags and the last raw response.
    pub fn state(&self) -> RequestState<Paginated<T>> {
        self.envelope.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState<Paginated<T>>> {
        self.envelope.subscribe()
    }

    pub fn teardown(&self) {
        self.envelope.teardown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use payloads::{ApiResponse, ClientError};
    use test_helpers::ops::{Recorder, Script};

    fn page_of(
        data: Vec<&'static str>,
        total_pages: u32,
        has_next: bool,
        has_prev: bool,
    ) -> Paginated<&'static str> {
        Paginated {
            total: data.len() as u64,
            data,
            page: 1,
            total_pages,
            has_next,
            has_prev,
        }
    }

    /// Serves pages from a fixed list, the way the backend does.
    fn catalogue() -> (
        Recorder<PageRequest<()>>,
        PaginationController<u32, ()>,
    ) {
        let items: Vec<u32> = (1..=25).collect();
        let recorder = Recorder::new();
        let controller = PaginationController::new(
            10,
            recorder.operation(move |request: &PageRequest<()>| {
                Ok(ApiResponse::ok(Paginated::from_slice(
                    &items,
                    request.page,
                    request.limit,
                )))
            }),
        );
        (recorder, controller)
    }

    #[tokio::test]
    async fn single_page_scenario() {
        let recorder = Recorder::new();
        let controller = PaginationController::new(
            10,
            recorder.operation(|_: &PageRequest<()>| {
                Ok(ApiResponse::ok(page_of(vec!["p1", "p2"], 1, false, false)))
            }),
        );

        let outcome = controller.load_page(1, ()).await;
        assert!(outcome.is_success());
        assert_eq!(controller.items(), vec!["p1", "p2"]);
        let pagination = controller.pagination();
        assert_eq!(pagination.page, 1);
        assert!(!pagination.has_next);
        assert_eq!(pagination.total, 2);

        assert!(controller.next_page(()).await.is_none());
        assert_eq!(controller.pagination().page, 1);
        assert_eq!(recorder.calls().len(), 1);
    }

    #[tokio::test]
    async fn navigation_follows_response_flags() {
        let (recorder, controller) = catalogue();

        controller.load_page(1, ()).await;
        assert!(controller.prev_page(()).await.is_none());

        controller.next_page(()).await;
        assert_eq!(controller.pagination().page, 2);
        assert_eq!(controller.items().first(), Some(&11));

        controller.next_page(()).await;
        assert_eq!(controller.items(), vec![21, 22, 23, 24, 25]);
        assert!(controller.next_page(()).await.is_none());

        controller.prev_page(()).await;
        assert_eq!(controller.pagination().page, 2);

        let pages: Vec<u32> =
            recorder.calls().iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![1, 2, 3, 2]);
    }

    #[tokio::test]
    async fn go_to_page_rejects_out_of_range() {
        let (recorder, controller) = catalogue();
        controller.load_page(1, ()).await;
        let total_pages = controller.pagination().total_pages;
        assert_eq!(total_pages, 3);

        assert!(controller.go_to_page(0, ()).await.is_none());
        assert!(controller.go_to_page(total_pages + 1, ()).await.is_none());
        assert_eq!(recorder.calls().len(), 1);

        assert!(controller.go_to_page(3, ()).await.is_some());
        assert_eq!(controller.pagination().page, 3);
    }

    #[tokio::test]
    async fn set_limit_resets_page_without_loading() {
        let (recorder, controller) = catalogue();
        controller.load_page(1, ()).await;
        controller.next_page(()).await;

        controller.set_limit(5);

        let pagination = controller.pagination();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 5);
        assert_eq!(recorder.calls().len(), 2);

        controller.load_page(1, ()).await;
        assert_eq!(controller.items(), vec![1, 2, 3, 4, 5]);
        assert_eq!(controller.pagination().total_pages, 5);

        controller.set_limit(0);
        assert_eq!(controller.pagination().limit, 5);
    }

    #[tokio::test]
    async fn set_limit_discards_load_in_flight() {
        let script = Script::new();
        let controller = Arc::new(PaginationController::new(
            10,
            script.operation(),
        ));

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.load_page(2, ()).await }
        });
        script.wait_for_calls(1).await;
        controller.set_limit(5);
        assert!(!controller.state().loading);

        script.resolve(0, page_of(vec!["sized for ten"], 3, true, true));
        assert_eq!(pending.await.unwrap(), Outcome::Superseded);

        let pagination = controller.pagination();
        assert_eq!(pagination.limit, 5);
        assert_eq!(pagination.page, 1);
        assert!(controller.items().is_empty());

        let next = tokio::spawn({
            let controller = controller.clone();
            async move { controller.load_page(1, ()).await }
        });
        script.wait_for_calls(2).await;
        assert_eq!(script.args()[1].limit, 5);
        script.resolve(1, page_of(vec!["a"], 1, false, false));
        assert!(next.await.unwrap().is_success());
    }

    #[tokio::test]
    async fn next_page_stops_at_the_last_page_number() {
        let recorder = Recorder::new();
        let controller = PaginationController::new(
            10,
            recorder.operation(|_: &PageRequest<()>| {
                Ok(ApiResponse::ok(page_of(vec!["end"], 1, true, true)))
            }),
        );
        controller.load_page(u32::MAX, ()).await;
        assert!(controller.pagination().has_next);

        assert!(controller.next_page(()).await.is_none());
        assert_eq!(recorder.count(), 1);
        assert_eq!(controller.pagination().page, u32::MAX);
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_page() {
        let recorder = Recorder::new();
        let controller = PaginationController::new(
            2,
            recorder.operation(|request: &PageRequest<()>| {
                if request.page == 1 {
                    Ok(ApiResponse::ok(page_of(vec!["a", "b"], 2, true, false)))
                } else {
                    Err(ClientError::Timeout)
                }
            }),
        );
        controller.load_page(1, ()).await;
        let before = controller.view();

        let outcome = controller.next_page(()).await;

        assert!(matches!(outcome, Some(Outcome::Failure(_))));
        assert_eq!(controller.view(), before);
        assert!(controller.state().error.is_some());
        assert!(!controller.state().loading);
    }

    #[tokio::test]
    async fn inconsistent_backend_flags_are_trusted() {
        let recorder = Recorder::new();
        let controller = PaginationController::new(
            10,
            recorder.operation(|_: &PageRequest<()>| {
                // claims a next page while also claiming a single page
                Ok(ApiResponse::ok(page_of(vec!["only"], 1, true, false)))
            }),
        );

        controller.load_page(1, ()).await;

        assert!(controller.pagination().has_next);
        assert!(controller.next_page(()).await.is_some());
        assert_eq!(recorder.calls().len(), 2);
    }

    #[tokio::test]
    async fn superseded_load_does_not_touch_pagination() {
        let script = Script::new();
        let controller = Arc::new(PaginationController::new(
            10,
            script.operation(),
        ));

        let slow = tokio::spawn({
            let controller = controller.clone();
            async move { controller.load_page(5, ()).await }
        });
        script.wait_for_calls(1).await;
        let fast = tokio::spawn({
            let controller = controller.clone();
            async move { controller.load_page(2, ()).await }
        });
        script.wait_for_calls(2).await;

        script.resolve(1, page_of(vec!["page two"], 5, true, true));
        assert!(fast.await.unwrap().is_success());
        script.resolve(0, page_of(vec!["page five"], 5, false, true));
        assert_eq!(slow.await.unwrap(), Outcome::Superseded);

        assert_eq!(controller.pagination().page, 2);
        assert_eq!(controller.items(), vec!["page two"]);
    }

    #[tokio::test]
    async fn extra_arguments_reach_the_operation() {
        let recorder = Recorder::new();
        let controller = PaginationController::new(
            4,
            recorder.operation(|_: &PageRequest<String>| {
                Ok(ApiResponse::ok(page_of(vec![], 0, false, false)))
            }),
        );

        controller.load_page(1, "city=leeds".to_string()).await;

        assert_eq!(
            recorder.calls(),
            vec![PageRequest {
                page: 1,
                limit: 4,
                extra: "city=leeds".to_string(),
            }]
        );
    }
}
