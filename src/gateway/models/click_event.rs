use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Interaction kind recorded against a product. Stored as the Postgres
/// enum `click_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "click_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClickKind {
    Buy,
    Details,
}

impl ClickKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClickKind::Buy => "buy",
            ClickKind::Details => "details",
        }
    }
}

/// Click event pending insertion into the append-only `product_clicks`
/// table. Constructors enforce the attribution invariant: never both
/// `user_id` and `session_id`.
#[derive(Debug, Clone)]
pub struct NewClickEvent {
    pub product_id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_id: Option<Uuid>,
    pub click_type: ClickKind,
}

impl NewClickEvent {
    pub fn authenticated(product_id: Uuid, click_type: ClickKind, user_id: Uuid) -> Self {
        Self {
            product_id,
            user_id: Some(user_id),
            session_id: None,
            click_type,
        }
    }

    /// Anonymous clicks get a fresh random session id per call; no session
    /// continuity is kept across clicks.
    pub fn anonymous(product_id: Uuid, click_type: ClickKind) -> Self {
        Self {
            product_id,
            user_id: None,
            session_id: Some(Uuid::new_v4()),
            click_type,
        }
    }
}

/// One row of the admin analytics window: a click joined with the product
/// name it landed on.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ClickActivity {
    pub id: Uuid,
    pub product_name: Option<String>,
    pub click_type: ClickKind,
    pub clicked_at: DateTime<Utc>,
}
