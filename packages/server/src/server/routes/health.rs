use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
}

/// Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "竞品分析API运行正常",
        version: env!("CARGO_PKG_VERSION"),
    })
}
