use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::ApiError;
use crate::gateway::models::ClickKind;
use crate::middleware::auth::{extract_bearer, validate_token};

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub product_id: Uuid,
    pub click_type: ClickKind,
}

/// POST /api/clicks
///
/// Records one product interaction. The insert is fire-and-forget: the
/// response is 202 as soon as the event is queued, and a storage failure
/// never surfaces to the storefront. Attribution comes from an optional
/// bearer token; without one (or with an unusable one) the click is
/// recorded anonymously under a fresh session id.
pub async fn record(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    Json(body): Json<ClickRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let user_id = caller_id(&headers, &ctx.config.security.jwt_secret);

    ctx.clicks.track(body.product_id, body.click_type, user_id);

    Ok((StatusCode::ACCEPTED, Json(json!({ "success": true }))))
}

fn caller_id(headers: &HeaderMap, secret: &str) -> Option<Uuid> {
    let token = extract_bearer(headers).ok()?;
    match validate_token(&token, secret) {
        Ok(claims) => Some(claims.sub),
        Err(err) => {
            // Clicks are best-effort; a bad token downgrades to anonymous
            debug!("click attribution token rejected: {}", err);
            None
        }
    }
}
