use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use catalog_api::config::AppConfig;
use catalog_api::context::AppContext;
use catalog_api::handlers::{admin, public};
use catalog_api::middleware::require_admin;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("starting catalog API in {:?} mode", config.environment);

    let port = config.api.port;
    let ctx = match AppContext::init(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("startup failed: {}", e);
            std::process::exit(1);
        }
    };

    let app = app(ctx.clone());

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {}", bind_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("catalog API listening on http://{}", bind_addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!("server error: {}", e);
    }

    ctx.shutdown().await;
}

fn app(ctx: AppContext) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(storefront_routes())
        .merge(admin_routes(ctx.clone()));

    if ctx.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if ctx.config.security.enable_cors {
        router = router.layer(cors_layer(&ctx.config.security.cors_origins));
    }

    router.with_state(ctx)
}

fn storefront_routes() -> Router<AppContext> {
    Router::new()
        .route("/api/products", get(public::products::list))
        .route("/api/products/:id", get(public::products::get))
        .route("/api/clicks", post(public::clicks::record))
}

fn admin_routes(ctx: AppContext) -> Router<AppContext> {
    Router::new()
        .route(
            "/api/admin/products",
            get(admin::products::list).post(admin::products::create),
        )
        .route(
            "/api/admin/products/:id",
            get(admin::products::get)
                .put(admin::products::update)
                .delete(admin::products::remove),
        )
        .route("/api/admin/analytics", get(admin::analytics::recent))
        .route_layer(axum_middleware::from_fn_with_state(ctx, require_admin))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("shutdown signal received");
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Catalog API",
            "version": version,
            "endpoints": {
                "home": "/ (public)",
                "products": "/api/products?page=N&q=term, /api/products/:id (public)",
                "clicks": "/api/clicks (public)",
                "admin_products": "/api/admin/products[/:id] (admin)",
                "admin_analytics": "/api/admin/analytics (admin)"
            }
        }
    }))
}

async fn health(
    axum::extract::State(ctx): axum::extract::State<AppContext>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match ctx.health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
