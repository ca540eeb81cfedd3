use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::catalog::ProductAdmin;
use crate::clicks::ClickRecorder;
use crate::config::AppConfig;
use crate::gateway::{self, GatewayError, PgCatalog, PgClickSink};

/// Shared application state, built once at startup and handed to every
/// handler through axum's `State`. Owns the pool and the service objects
/// wired on top of it.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub pool: PgPool,
    pub catalog: PgCatalog,
    pub admin: ProductAdmin,
    pub clicks: ClickRecorder,
}

impl AppContext {
    pub async fn init(config: AppConfig) -> Result<Self, GatewayError> {
        let pool = gateway::connect_pool(&config.database).await?;

        if config.database.run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| GatewayError::QueryError(e.to_string()))?;
            info!("database migrations applied");
        }

        Ok(Self {
            config: Arc::new(config),
            catalog: PgCatalog::new(pool.clone()),
            admin: ProductAdmin::new(pool.clone()),
            clicks: ClickRecorder::new(Arc::new(PgClickSink::new(pool.clone()))),
            pool,
        })
    }

    pub async fn health_check(&self) -> Result<(), GatewayError> {
        gateway::pool::health_check(&self.pool).await
    }

    pub async fn shutdown(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}
