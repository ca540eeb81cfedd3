use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::clicks::ClickSink;
use crate::feed::{PageQuery, PageResult, ProductStore};
use crate::gateway::error::GatewayError;
use crate::gateway::models::{NewClickEvent, Product};
use crate::gateway::query::QueryBuilder;

const PRODUCTS: &str = "products";
const PRODUCT_CLICKS: &str = "product_clicks";

// The JSON filter layer binds string params as TEXT, which Postgres will not
// compare against a UUID column; id lookups bind the uuid directly.
const PRODUCT_BY_ID_SQL: &str = "SELECT * FROM \"products\" WHERE id = $1";

/// Postgres-backed product reads for the feed.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgCatalog {
    async fn fetch_page(&self, query: &PageQuery) -> Result<PageResult, GatewayError> {
        let filter_data = query.to_filter_data();

        let rows = QueryBuilder::<Product>::new(PRODUCTS)?
            .filter(filter_data.clone())?
            .select_all(&self.pool)
            .await?;

        let total = QueryBuilder::<Product>::new(PRODUCTS)?
            .filter(filter_data)?
            .count(&self.pool)
            .await?;

        Ok(PageResult { rows, total })
    }

    async fn fetch_product(&self, id: Uuid) -> Result<Option<Product>, GatewayError> {
        sqlx::query_as::<_, Product>(PRODUCT_BY_ID_SQL)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| GatewayError::from_sqlx(PRODUCTS, e))
    }
}

/// Postgres-backed click-event writes. Append-only: the core never updates
/// or deletes rows in `product_clicks`.
#[derive(Clone)]
pub struct PgClickSink {
    pool: PgPool,
}

impl PgClickSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickSink for PgClickSink {
    async fn record(&self, event: NewClickEvent) -> Result<(), GatewayError> {
        sqlx::query(
            "INSERT INTO \"product_clicks\" (product_id, user_id, session_id, click_type) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(event.product_id)
        .bind(event.user_id)
        .bind(event.session_id)
        .bind(event.click_type)
        .execute(&self.pool)
        .await
        .map_err(|e| GatewayError::from_sqlx(PRODUCT_CLICKS, e))?;
        Ok(())
    }
}
