//! Product feed core: one-page queries against the catalog, the controller
//! that accumulates pages across an infinite-scroll session, and the
//! near-end-of-list capability that drives it.

pub mod controller;
pub mod sentinel;

use async_trait::async_trait;
use serde_json::json;
use uuid::Uuid;

use crate::filter::FilterData;
use crate::gateway::models::Product;
use crate::gateway::GatewayError;

pub use controller::{FeedController, FeedState, PageRequest};
pub use sentinel::{LoadMoreButton, NearEnd, ScrollSentinel};

/// Fixed feed window size.
pub const PAGE_SIZE: usize = 12;

/// Highest addressable page: past this the row offset no longer fits the
/// query layer. Requests beyond it clamp and come back as an empty page.
pub const MAX_PAGE: u32 = i32::MAX as u32 / PAGE_SIZE as u32;

/// One page of the feed: page number (1-based) plus the active search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub search: String,
}

impl PageQuery {
    /// Page numbers clamp into `1..=MAX_PAGE`.
    pub fn new(page: u32, search: impl Into<String>) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            search: search.into(),
        }
    }

    /// Offset of the first row of this page. Computed in i64; the page clamp
    /// keeps the result within i32.
    pub fn offset(&self) -> i32 {
        ((self.page as i64 - 1) * PAGE_SIZE as i64) as i32
    }

    /// Compile to the gateway filter: newest first, fixed window, and a
    /// case-insensitive substring match on name OR description when a
    /// search term is present.
    pub fn to_filter_data(&self) -> FilterData {
        let mut data = FilterData {
            order: Some(json!("created_at desc")),
            limit: Some(PAGE_SIZE as i32),
            offset: Some(self.offset()),
            ..Default::default()
        };
        if !self.search.is_empty() {
            let pattern = like_pattern(&self.search);
            data.where_clause = Some(json!({
                "$or": [
                    { "name": { "$ilike": pattern } },
                    { "description": { "$ilike": pattern } }
                ]
            }));
        }
        data
    }
}

/// Rows for one page together with the total matching row count.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub rows: Vec<Product>,
    pub total: i64,
}

/// Whether another page should be fetched after this one. Both conditions
/// must hold: a final partial page reports false even when the count math
/// would suggest another page. The total can drift under concurrent inserts
/// between pages; that race is accepted, not corrected.
pub fn has_more(rows_returned: usize, page: u32, total: i64) -> bool {
    rows_returned == PAGE_SIZE && total > (page as i64) * (PAGE_SIZE as i64)
}

/// Read seam over the product catalog. Implemented by the Postgres gateway
/// and by in-memory stores in tests.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult, GatewayError>;
    async fn fetch_product(&self, id: Uuid) -> Result<Option<Product>, GatewayError>;
}

/// Escape LIKE metacharacters so the search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_numbers_are_one_based() {
        assert_eq!(PageQuery::new(0, "").page, 1);
        assert_eq!(PageQuery::new(1, "").offset(), 0);
        assert_eq!(PageQuery::new(3, "").offset(), 24);
    }

    #[test]
    fn extreme_page_numbers_clamp_instead_of_overflowing() {
        let query = PageQuery::new(200_000_000, "");
        assert_eq!(query.page, MAX_PAGE);
        assert!(query.offset() >= 0);

        let query = PageQuery::new(u32::MAX, "");
        assert_eq!(query.page, MAX_PAGE);
        let offset = query.offset();
        assert!(offset >= 0, "offset must stay addressable, got {}", offset);
    }

    #[test]
    fn empty_search_has_no_where_clause() {
        let data = PageQuery::new(1, "").to_filter_data();
        assert!(data.where_clause.is_none());
        assert_eq!(data.limit, Some(12));
    }

    #[test]
    fn search_builds_or_of_ilike() {
        let data = PageQuery::new(2, "phone").to_filter_data();
        let where_clause = data.where_clause.unwrap();
        let arms = where_clause["$or"].as_array().unwrap();
        assert_eq!(arms.len(), 2);
        assert_eq!(arms[0]["name"]["$ilike"], "%phone%");
        assert_eq!(arms[1]["description"]["$ilike"], "%phone%");
        assert_eq!(data.offset, Some(12));
    }

    #[test]
    fn like_metacharacters_match_literally() {
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }

    #[test]
    fn has_more_requires_both_conditions() {
        // full page, more behind it
        assert!(has_more(12, 1, 30));
        // partial page is always terminal, whatever the count says
        assert!(!has_more(6, 3, 30));
        assert!(!has_more(11, 1, 100));
        // full page but the count boundary is reached
        assert!(!has_more(12, 1, 12));
        assert!(!has_more(12, 2, 24));
    }
}
