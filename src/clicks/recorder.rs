use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::gateway::models::{ClickKind, NewClickEvent};
use crate::gateway::GatewayError;

/// Write seam for click events. Implemented by the Postgres gateway and by
/// fakes in tests.
#[async_trait]
pub trait ClickSink: Send + Sync {
    async fn record(&self, event: NewClickEvent) -> Result<(), GatewayError>;
}

/// Best-effort click logging. Recording is strictly secondary to the user
/// action it annotates: failures are logged and swallowed, never retried,
/// and never propagate to the caller.
#[derive(Clone)]
pub struct ClickRecorder {
    sink: Arc<dyn ClickSink>,
}

impl ClickRecorder {
    pub fn new(sink: Arc<dyn ClickSink>) -> Self {
        Self { sink }
    }

    /// Fire-and-forget: returns immediately, the insert runs detached so the
    /// navigation or redirect it accompanies is never blocked.
    pub fn track(&self, product_id: Uuid, kind: ClickKind, user_id: Option<Uuid>) {
        let event = Self::event(product_id, kind, user_id);
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(err) = sink.record(event).await {
                debug!(product_id = %product_id, kind = kind.as_str(), error = %err,
                    "failed to record click");
            }
        });
    }

    /// Awaitable variant for callers that want the attempt to finish before
    /// proceeding. Still swallows failures.
    pub async fn track_now(&self, product_id: Uuid, kind: ClickKind, user_id: Option<Uuid>) {
        let event = Self::event(product_id, kind, user_id);
        if let Err(err) = self.sink.record(event).await {
            debug!(product_id = %product_id, kind = kind.as_str(), error = %err,
                "failed to record click");
        }
    }

    fn event(product_id: Uuid, kind: ClickKind, user_id: Option<Uuid>) -> NewClickEvent {
        match user_id {
            Some(user) => NewClickEvent::authenticated(product_id, kind, user),
            None => NewClickEvent::anonymous(product_id, kind),
        }
    }
}
