use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::feed::{has_more, PageQuery, ProductStore, PAGE_SIZE};

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    pub page: Option<u32>,
    pub q: Option<String>,
}

/// GET /api/products?page=N&q=term
///
/// One feed window, newest first. The client accumulates pages; the server
/// answers each page independently and reports whether another one should
/// be fetched.
pub async fn list(
    State(ctx): State<AppContext>,
    Query(params): Query<FeedParams>,
) -> Result<Json<Value>, ApiError> {
    let query = PageQuery::new(
        params.page.unwrap_or(1),
        params.q.unwrap_or_default().trim(),
    );

    let result = ctx.catalog.fetch_page(&query).await?;
    let more = has_more(result.rows.len(), query.page, result.total);

    Ok(Json(json!({
        "success": true,
        "data": result.rows,
        "page": query.page,
        "page_size": PAGE_SIZE,
        "total": result.total,
        "has_more": more
    })))
}

/// GET /api/products/:id
pub async fn get(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let product = ctx
        .catalog
        .fetch_product(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Product not found: {}", id)))?;

    Ok(Json(json!({
        "success": true,
        "data": product
    })))
}
