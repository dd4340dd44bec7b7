//! Moments server library logic.

pub mod api_moments;
pub mod client;
pub mod config;
pub mod middleware;

use axum::{routing::get, Extension, Json, Router};
use moments_db::DbPool;
use moments_finder::{ExtensionClient, MomentFinder};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::client::SqliteClient;
use crate::config::MomentsConfig;

/// Path prefix of the public moment API.
pub const API_PREFIX: &str = "/apis/api.moment.halo.run/v1alpha1";

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Visibility-aware listing over `client`.
    pub finder: MomentFinder,
    /// Storage access, also used to resolve viewers.
    pub client: Arc<dyn ExtensionClient>,
    /// Page size applied when a request leaves `size` out.
    pub default_page_size: u32,
}

impl AppState {
    pub fn new(pool: DbPool, moments: &MomentsConfig) -> Self {
        let client: Arc<dyn ExtensionClient> = Arc::new(SqliteClient::new(pool));
        Self {
            finder: MomentFinder::new(client.clone()).with_list_all_limit(moments.list_all_limit),
            client,
            default_page_size: moments.default_page_size,
        }
    }
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    let moment_routes = Router::new()
        .route("/moments", get(api_moments::list_moments_handler))
        .route("/moments/-/tags", get(api_moments::list_tags_handler))
        .route("/moments/{name}", get(api_moments::get_moment_handler))
        .layer(axum::middleware::from_fn(middleware::viewer_middleware));

    Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, moment_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
