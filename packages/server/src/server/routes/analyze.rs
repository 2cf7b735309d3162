//! One-shot analysis endpoint.
//!
//! POST /api/analyze
//!
//! Runs the full pipeline and answers with the finished result. Upstream
//! failures degrade the result rather than failing the request, so the only
//! client error is a request with neither a domain nor features.

use axum::{extract::Extension, http::StatusCode, Json};
use competitor_scout::{AnalysisRequest, AnalysisResult, ScoutError};
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
    pub message: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl AnalyzeResponse {
    pub fn new(result: AnalysisResult) -> Self {
        let message = result.message();
        Self { result, message }
    }
}

/// Map a pipeline error to a status code and `{error}` body.
pub fn api_error(e: &ScoutError) -> ApiError {
    let status = if e.is_user_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

pub async fn analyze_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    match state.scout.run(&request).await {
        Ok(result) => Ok(Json(AnalyzeResponse::new(result))),
        Err(e) => {
            if e.is_user_error() {
                tracing::info!(error = %e, "Rejected analysis request");
            } else {
                tracing::error!(error = %e, "Analysis failed");
            }
            Err(api_error(&e))
        }
    }
}
