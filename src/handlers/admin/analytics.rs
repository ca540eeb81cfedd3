use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::clicks::{recent_activity, summarize};
use crate::context::AppContext;
use crate::error::ApiError;

const DEFAULT_WINDOW: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct AnalyticsParams {
    pub limit: Option<i64>,
}

/// GET /api/admin/analytics?limit=N
///
/// Latest clicks joined with product names, plus counters over that window.
/// The window is capped by configuration; the stats describe the returned
/// rows, not the whole table.
pub async fn recent(
    State(ctx): State<AppContext>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_WINDOW)
        .clamp(1, ctx.config.api.analytics_max_rows);

    let activity = recent_activity(&ctx.pool, limit).await?;
    let stats = summarize(&activity);

    Ok(Json(json!({
        "success": true,
        "data": {
            "clicks": activity,
            "stats": stats
        }
    })))
}
