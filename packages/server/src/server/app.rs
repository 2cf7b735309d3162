//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::SharedScout;
use crate::server::routes::{analyze_handler, analyze_stream_handler, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scout: Arc<SharedScout>,
}

/// Build the Axum application router
pub fn build_app(scout: SharedScout, allowed_origins: &[String]) -> Router {
    let app_state = AppState {
        scout: Arc::new(scout),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/analyze/stream", post(analyze_stream_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
