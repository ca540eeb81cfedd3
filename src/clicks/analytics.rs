use serde::Serialize;
use sqlx::PgPool;

use crate::gateway::models::{ClickActivity, ClickKind};
use crate::gateway::GatewayError;

/// Interaction counters over one analytics window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClickStats {
    pub total: usize,
    pub buy: usize,
    pub details: usize,
}

/// Latest clicks joined with the product name they landed on, newest first.
/// Clicks on since-deleted products keep a row with no product name.
pub async fn recent_activity(
    pool: &PgPool,
    limit: i64,
) -> Result<Vec<ClickActivity>, GatewayError> {
    sqlx::query_as::<_, ClickActivity>(
        "SELECT c.id, c.click_type, c.clicked_at, p.name AS product_name \
         FROM \"product_clicks\" c \
         LEFT JOIN \"products\" p ON p.id = c.product_id \
         ORDER BY c.clicked_at DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| GatewayError::from_sqlx("product_clicks", e))
}

/// Counters computed over the fetched window (not the whole table).
pub fn summarize(clicks: &[ClickActivity]) -> ClickStats {
    let mut stats = ClickStats {
        total: clicks.len(),
        ..Default::default()
    };
    for click in clicks {
        match click.click_type {
            ClickKind::Buy => stats.buy += 1,
            ClickKind::Details => stats.details += 1,
        }
    }
    stats
}
