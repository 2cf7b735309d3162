//! SSE streaming analysis endpoint.
//!
//! POST /api/analyze/stream
//!
//! Runs the pipeline in a background task and forwards one event per stage,
//! named after the stage (`queries_generated`, `search_completed`, ...). The
//! stream ends with `complete` carrying `{result, message}`, or `error`.

use std::convert::Infallible;

use axum::{
    extract::Extension,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use competitor_scout::{AnalysisRequest, ProgressEvent, ScoutError};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_stream::wrappers::ReceiverStream;

use super::analyze::{api_error, AnalyzeResponse, ApiError, ErrorResponse};
use crate::server::app::AppState;

const PROGRESS_BUFFER: usize = 16;

/// Aborts the wrapped task when dropped.
///
/// Owned by the response stream, so a client that disconnects mid-run
/// cancels the pipeline instead of leaving it running detached.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

pub async fn analyze_stream_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // Reject before opening the stream so the client gets a plain 400.
    if !request.is_searchable() {
        return Err(api_error(&ScoutError::invalid_input(
            "at least one of domain or features is required",
        )));
    }

    let (tx, rx) = mpsc::channel::<ProgressEvent>(PROGRESS_BUFFER);
    let scout = state.scout.clone();
    let mut run = AbortOnDrop(tokio::spawn(async move {
        scout.run_with_progress(&request, tx).await
    }));

    // The sender is dropped when the run ends, which closes the progress stream.
    let progress = ReceiverStream::new(rx).map(|event| Ok(json_event(event.stage(), &event)));

    let finished = stream::once(async move {
        let event = match (&mut run.0).await {
            Ok(Ok(result)) => json_event("complete", &AnalyzeResponse::new(result)),
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Streaming analysis failed");
                error_event(e.to_string())
            }
            Err(e) => {
                tracing::error!(error = %e, "Streaming analysis task panicked");
                error_event("analysis task failed".to_string())
            }
        };
        Ok(event)
    });

    Ok(Sse::new(progress.chain(finished)).keep_alive(KeepAlive::default()))
}

fn json_event<T: Serialize>(name: &str, payload: &T) -> Event {
    Event::default()
        .event(name)
        .json_data(payload)
        .unwrap_or_else(|e| error_event(e.to_string()))
}

fn error_event(error: String) -> Event {
    let body = serde_json::to_string(&ErrorResponse { error }).unwrap_or_default();
    Event::default().event("error").data(body)
}
