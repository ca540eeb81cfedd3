use tracing::{debug, warn};

use super::{has_more, PageQuery, PageResult, ProductStore};
use crate::gateway::models::Product;
use crate::gateway::GatewayError;

/// State owned by the feed controller.
#[derive(Debug, Clone)]
pub struct FeedState {
    /// Last requested page, 1-based.
    pub page: u32,
    /// Accumulated rows, append-only within one search session.
    pub products: Vec<Product>,
    /// Active search term.
    pub search: String,
    pub has_more: bool,
    pub loading: bool,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            page: 1,
            products: vec![],
            search: String::new(),
            has_more: true,
            loading: false,
        }
    }
}

/// A page fetch the controller has issued. The id ties the eventual response
/// back to the state that requested it; responses whose id no longer matches
/// the in-flight fetch are stale and get discarded.
#[derive(Debug, Clone)]
pub struct PageRequest {
    id: u64,
    pub page: u32,
    pub search: String,
}

impl PageRequest {
    pub fn query(&self) -> PageQuery {
        PageQuery::new(self.page, self.search.clone())
    }
}

/// Coordinates the paginated product query with the search filter and the
/// scroll-triggered next-page fetch. Issue requests with [`reset_search`]
/// / [`request_next`], resolve them with [`apply`] (or let [`load`] do the
/// round trip).
///
/// [`reset_search`]: FeedController::reset_search
/// [`request_next`]: FeedController::request_next
/// [`apply`]: FeedController::apply
/// [`load`]: FeedController::load
#[derive(Debug, Default)]
pub struct FeedController {
    state: FeedState,
    inflight: Option<u64>,
    next_request_id: u64,
}

impl FeedController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn products(&self) -> &[Product] {
        &self.state.products
    }

    /// Search term changed: reset to page 1, clear the accumulated list and
    /// issue a fetch for the new term. Supersedes any in-flight fetch.
    pub fn reset_search(&mut self, term: impl Into<String>) -> PageRequest {
        self.state.search = term.into();
        self.state.page = 1;
        self.state.products.clear();
        self.state.has_more = true;
        self.issue()
    }

    /// Scroll sentinel fired: issue the next page, unless a fetch is already
    /// in flight or the feed is exhausted.
    pub fn request_next(&mut self) -> Option<PageRequest> {
        if self.state.loading || !self.state.has_more {
            return None;
        }
        self.state.page += 1;
        Some(self.issue())
    }

    /// Resolve a previously issued request. Stale responses (the request is
    /// no longer the in-flight one, e.g. the search changed meanwhile) are
    /// discarded without touching state.
    pub fn apply(&mut self, request: &PageRequest, outcome: Result<PageResult, GatewayError>) {
        if self.inflight != Some(request.id) {
            debug!(page = request.page, search = %request.search, "discarding stale page response");
            return;
        }
        self.inflight = None;
        self.state.loading = false;

        match outcome {
            Ok(result) => {
                let returned = result.rows.len();
                if request.page == 1 {
                    self.state.products = result.rows;
                } else {
                    // Append in received order; no dedup, no reorder
                    self.state.products.extend(result.rows);
                }
                self.state.has_more = has_more(returned, request.page, result.total);
            }
            Err(err) => {
                warn!(page = request.page, search = %request.search, error = %err,
                    "page load failed; feed state left unchanged");
                if request.page > 1 {
                    // Roll the counter back so the next signal retries this
                    // page instead of skipping it
                    self.state.page = request.page - 1;
                } else {
                    // Initial page failed: stop automatic fetches until the
                    // search term changes again
                    self.state.has_more = false;
                }
            }
        }
    }

    /// Fetch via the store and apply the outcome.
    pub async fn load<S: ProductStore + ?Sized>(&mut self, store: &S, request: PageRequest) {
        let outcome = store.fetch_page(&request.query()).await;
        self.apply(&request, outcome);
    }

    fn issue(&mut self) -> PageRequest {
        self.next_request_id += 1;
        let id = self.next_request_id;
        self.inflight = Some(id);
        self.state.loading = true;
        PageRequest {
            id,
            page: self.state.page,
            search: self.state.search.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn product(name: &str) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            image_url: None,
            external_link: "https://shop.example.com/item".to_string(),
            created_at: Utc::now() - Duration::seconds(1),
        }
    }

    fn page_of(count: usize, total: i64) -> PageResult {
        PageResult {
            rows: (0..count).map(|i| product(&format!("p{}", i))).collect(),
            total,
        }
    }

    #[test]
    fn page_one_replaces_accumulated_list() {
        let mut ctrl = FeedController::new();
        let req = ctrl.reset_search("");
        ctrl.apply(&req, Ok(page_of(12, 30)));
        assert_eq!(ctrl.products().len(), 12);

        let req = ctrl.reset_search("lamp");
        ctrl.apply(&req, Ok(page_of(3, 3)));
        assert_eq!(ctrl.products().len(), 3, "fresh search replaces, never appends");
        assert!(!ctrl.state().has_more);
    }

    #[test]
    fn later_pages_append_in_received_order() {
        let mut ctrl = FeedController::new();
        let req = ctrl.reset_search("");
        let first = page_of(12, 30);
        let first_names: Vec<String> = first.rows.iter().map(|p| p.name.clone()).collect();
        ctrl.apply(&req, Ok(first));

        let req = ctrl.request_next().unwrap();
        assert_eq!(req.page, 2);
        let second = page_of(12, 30);
        let second_names: Vec<String> = second.rows.iter().map(|p| p.name.clone()).collect();
        ctrl.apply(&req, Ok(second));

        let all: Vec<String> = ctrl.products().iter().map(|p| p.name.clone()).collect();
        assert_eq!(all.len(), 24);
        assert_eq!(&all[..12], first_names.as_slice());
        assert_eq!(&all[12..], second_names.as_slice());
    }

    #[test]
    fn loading_flag_gates_reentrancy() {
        let mut ctrl = FeedController::new();
        let req = ctrl.reset_search("");
        ctrl.apply(&req, Ok(page_of(12, 30)));

        let first = ctrl.request_next();
        assert!(first.is_some());
        // Second signal while the fetch is in flight is a no-op
        assert!(ctrl.request_next().is_none());
    }

    #[test]
    fn exhausted_feed_stops_requesting() {
        let mut ctrl = FeedController::new();
        let req = ctrl.reset_search("");
        ctrl.apply(&req, Ok(page_of(5, 5)));
        assert!(!ctrl.state().has_more);
        assert!(ctrl.request_next().is_none());
    }

    #[test]
    fn stale_response_after_search_change_is_discarded() {
        let mut ctrl = FeedController::new();
        let old_req = ctrl.reset_search("old");
        let new_req = ctrl.reset_search("new");

        // The response for the abandoned search arrives late
        ctrl.apply(&old_req, Ok(page_of(12, 100)));
        assert!(ctrl.products().is_empty(), "stale rows must never merge");
        assert!(ctrl.state().loading, "the newer fetch is still in flight");

        ctrl.apply(&new_req, Ok(page_of(4, 4)));
        assert_eq!(ctrl.products().len(), 4);
        assert!(!ctrl.state().loading);
    }

    #[test]
    fn failed_append_keeps_state_and_allows_retry_of_same_page() {
        let mut ctrl = FeedController::new();
        let req = ctrl.reset_search("");
        ctrl.apply(&req, Ok(page_of(12, 30)));

        let req = ctrl.request_next().unwrap();
        assert_eq!(req.page, 2);
        ctrl.apply(&req, Err(GatewayError::QueryError("connection reset".to_string())));

        assert_eq!(ctrl.products().len(), 12, "accumulated list untouched on failure");
        assert!(!ctrl.state().loading);
        let retry = ctrl.request_next().unwrap();
        assert_eq!(retry.page, 2, "retry targets the missed page");
    }

    #[test]
    fn failed_first_page_goes_terminal_until_next_search() {
        let mut ctrl = FeedController::new();
        let req = ctrl.reset_search("phone");
        ctrl.apply(&req, Err(GatewayError::QueryError("timeout".to_string())));

        assert!(ctrl.products().is_empty());
        assert!(!ctrl.state().has_more);
        assert!(ctrl.request_next().is_none());

        // A new search term re-arms the feed
        let req = ctrl.reset_search("tv");
        assert_eq!(req.page, 1);
        assert!(ctrl.state().loading);
    }
}
