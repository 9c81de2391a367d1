//! The tracking endpoints — snippet script and collection pixel.

use std::sync::LazyLock;

use axum::{
  extract::{Query, State, rejection::QueryRejection},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use beacon_core::{
  attributes::CollectParams,
  collect::{CollectOutcome, ingest},
  store::{AnalyticsStore, is_valid_tracking_id},
};
use serde::Deserialize;

use crate::{AppState, snippet};

/// Transparent 1×1 GIF pixel.
static PIXEL: LazyLock<Vec<u8>> = LazyLock::new(|| {
  B64
    .decode("R0lGODlhAQABAIAAANvf7wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==")
    .expect("embedded pixel is valid base64")
});

// ─── Script ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScriptParams {
  pub tid: Option<String>,
}

/// `GET /a.js?tid=…` — serve the tracking snippet.
///
/// The one path that may fail visibly: an invalid or unknown tracking id is
/// a 404, so the script never loads for a misconfigured embed. Which of the
/// two failed is never revealed.
pub async fn script<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<ScriptParams>,
) -> Response
where
  S: AnalyticsStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Some(tid) = params.tid.as_deref() else {
    return StatusCode::NOT_FOUND.into_response();
  };

  match is_valid_tracking_id(state.store.as_ref(), Some(tid)).await {
    Ok(true) => {}
    Ok(false) => return StatusCode::NOT_FOUND.into_response(),
    Err(e) => {
      tracing::error!("tracking id validation failed: {e}");
      return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
  }

  let body = snippet::render(&state.config.public_url, tid);
  ([(header::CONTENT_TYPE, "text/javascript")], body).into_response()
}

// ─── Collect ─────────────────────────────────────────────────────────────────

/// `GET /a.gif?tid=…&url=…[&ref=…&t=…&wiw=…&wih=…]` — the collection
/// endpoint.
///
/// Always answers with the pixel, whatever the outcome; neither validation
/// skips nor storage failures are visible to the embedding page.
pub async fn collect<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<CollectParams>, QueryRejection>,
  headers: HeaderMap,
) -> Response
where
  S: AnalyticsStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  // A query string we cannot deserialise still gets the pixel; it simply
  // carries no usable parameters.
  let params = params.map(|Query(p)| p).unwrap_or_default();
  let dnt = headers.get("dnt").and_then(|v| v.to_str().ok());

  match ingest(state.store.as_ref(), &params, dnt).await {
    Ok(CollectOutcome::Recorded(view)) => {
      tracing::debug!(project_id = %view.project_id, path = %view.path, "page view recorded");
    }
    Ok(outcome) => tracing::debug!(?outcome, "collection skipped"),
    Err(e) => tracing::error!("page view not recorded: {e}"),
  }

  pixel_response()
}

fn pixel_response() -> Response {
  (
    [
      (header::CONTENT_TYPE, "image/gif"),
      (header::CACHE_CONTROL, "private, no-cache"),
    ],
    PIXEL.clone(),
  )
    .into_response()
}
