use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::catalog;
use crate::context::AppContext;
use crate::error::ApiError;
use crate::gateway::models::NewProduct;

/// GET /api/admin/products — full listing for the management table.
pub async fn list(State(ctx): State<AppContext>) -> Result<Json<Value>, ApiError> {
    let products = ctx.admin.list().await?;
    Ok(Json(json!({
        "success": true,
        "data": products
    })))
}

/// GET /api/admin/products/:id
pub async fn get(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let product = ctx.admin.get(id).await?;
    Ok(Json(json!({
        "success": true,
        "data": product
    })))
}

/// POST /api/admin/products
pub async fn create(
    State(ctx): State<AppContext>,
    Json(input): Json<NewProduct>,
) -> Result<Json<Value>, ApiError> {
    catalog::validate(&input)
        .map_err(|errors| ApiError::validation_error("Invalid product", Some(errors)))?;

    let product = ctx.admin.create(input).await?;
    info!(product_id = %product.id, "product created");

    Ok(Json(json!({
        "success": true,
        "data": product
    })))
}

/// PUT /api/admin/products/:id — full-record replace.
pub async fn update(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewProduct>,
) -> Result<Json<Value>, ApiError> {
    catalog::validate(&input)
        .map_err(|errors| ApiError::validation_error("Invalid product", Some(errors)))?;

    let product = ctx.admin.update(id, input).await?;
    info!(product_id = %product.id, "product updated");

    Ok(Json(json!({
        "success": true,
        "data": product
    })))
}

/// DELETE /api/admin/products/:id
pub async fn remove(
    State(ctx): State<AppContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    ctx.admin.remove(id).await?;
    info!(product_id = %id, "product deleted");

    Ok(Json(json!({ "success": true })))
}
