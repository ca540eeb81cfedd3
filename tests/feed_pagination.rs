//! End-to-end feed behavior against an in-memory catalog: page accumulation,
//! search resets, scroll-triggered fetches and failure recovery.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use catalog_api::feed::sentinel::pump;
use catalog_api::feed::{
    FeedController, PageQuery, PageResult, ProductStore, ScrollSentinel, PAGE_SIZE,
};
use catalog_api::gateway::models::Product;
use catalog_api::gateway::GatewayError;

struct InMemoryStore {
    products: Vec<Product>,
    fail_next: AtomicBool,
}

impl InMemoryStore {
    fn seeded(count: usize) -> Self {
        let base = Utc::now();
        let products = (0..count)
            .map(|i| Product {
                id: Uuid::new_v4(),
                name: format!("Product {}", i),
                description: if i % 2 == 0 {
                    Some(format!("Gadget number {}", i))
                } else {
                    None
                },
                image_url: None,
                external_link: format!("https://shop.example.com/{}", i),
                // Strictly descending recency: product 0 is the newest
                created_at: base - Duration::seconds(i as i64),
            })
            .collect();
        Self {
            products,
            fail_next: AtomicBool::new(false),
        }
    }

    fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult, GatewayError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::QueryError("connection reset".to_string()));
        }

        let term = query.search.to_lowercase();
        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| {
                term.is_empty()
                    || p.name.to_lowercase().contains(&term)
                    || p.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            })
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matches.len() as i64;
        let rows = matches
            .into_iter()
            .skip(query.offset() as usize)
            .take(PAGE_SIZE)
            .cloned()
            .collect();

        Ok(PageResult { rows, total })
    }

    async fn fetch_product(&self, id: Uuid) -> Result<Option<Product>, GatewayError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }
}

#[tokio::test]
async fn scroll_walks_all_pages_newest_first() {
    let store = InMemoryStore::seeded(30);
    let mut ctrl = FeedController::new();
    let mut sentinel = ScrollSentinel::default();

    let request = ctrl.reset_search("");
    ctrl.load(&store, request).await;
    assert_eq!(ctrl.products().len(), 12);
    assert_eq!(ctrl.products()[0].name, "Product 0");
    assert!(ctrl.state().has_more);

    // Two more scroll triggers drain the remaining pages
    sentinel.sync(ctrl.state());
    sentinel.observe(0.2);
    assert!(pump(&mut ctrl, &mut sentinel, &store).await);
    assert_eq!(ctrl.products().len(), 24);

    sentinel.sync(ctrl.state());
    sentinel.observe(0.2);
    assert!(pump(&mut ctrl, &mut sentinel, &store).await);
    assert_eq!(ctrl.products().len(), 30);
    assert_eq!(ctrl.products()[29].name, "Product 29");
    assert!(!ctrl.state().has_more);

    // Feed exhausted: the sentinel unmounts and further triggers are no-ops
    sentinel.sync(ctrl.state());
    sentinel.observe(1.0);
    assert!(!pump(&mut ctrl, &mut sentinel, &store).await);
    assert_eq!(ctrl.products().len(), 30);
}

#[tokio::test]
async fn search_matches_name_and_description_case_insensitively() {
    let store = InMemoryStore::seeded(30);
    let mut ctrl = FeedController::new();

    // "gadget number 2" appears in descriptions of products 2, 20..28 (even)
    let request = ctrl.reset_search("GADGET NUMBER 2");
    ctrl.load(&store, request).await;

    assert!(!ctrl.products().is_empty());
    assert!(ctrl
        .products()
        .iter()
        .all(|p| p.description.as_deref().is_some_and(|d| d.contains("number 2"))));
}

#[tokio::test]
async fn empty_search_result_is_terminal() {
    let store = InMemoryStore::seeded(30);
    let mut ctrl = FeedController::new();

    let request = ctrl.reset_search("no such product");
    ctrl.load(&store, request).await;

    assert!(ctrl.products().is_empty());
    assert!(!ctrl.state().has_more);
    assert!(ctrl.request_next().is_none());
}

#[tokio::test]
async fn late_response_for_abandoned_search_is_discarded() {
    let store = InMemoryStore::seeded(30);
    let mut ctrl = FeedController::new();

    let old_request = ctrl.reset_search("");
    let new_request = ctrl.reset_search("Product 1");

    // The superseded fetch completes after the reset
    let stale_outcome = store.fetch_page(&old_request.query()).await;
    ctrl.apply(&old_request, stale_outcome);
    assert!(ctrl.products().is_empty(), "stale rows must not appear");

    ctrl.load(&store, new_request).await;
    assert!(ctrl
        .products()
        .iter()
        .all(|p| p.name.contains("Product 1")));
}

#[tokio::test]
async fn transient_failure_retries_the_same_page() {
    let store = InMemoryStore::seeded(30);
    let mut ctrl = FeedController::new();

    let request = ctrl.reset_search("");
    ctrl.load(&store, request).await;
    assert_eq!(ctrl.products().len(), 12);

    store.fail_next();
    let request = ctrl.request_next().unwrap();
    assert_eq!(request.page, 2);
    ctrl.load(&store, request).await;
    assert_eq!(ctrl.products().len(), 12, "failed page leaves the list intact");

    // Next trigger retries page 2 and succeeds
    let request = ctrl.request_next().unwrap();
    assert_eq!(request.page, 2);
    ctrl.load(&store, request).await;
    assert_eq!(ctrl.products().len(), 24);
}

#[tokio::test]
async fn single_product_lookup() {
    let store = InMemoryStore::seeded(5);
    let wanted = store.products[3].clone();

    let found = store.fetch_product(wanted.id).await.unwrap();
    assert_eq!(found, Some(wanted));

    let missing = store.fetch_product(Uuid::new_v4()).await.unwrap();
    assert_eq!(missing, None);
}
