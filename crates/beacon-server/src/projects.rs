//! Handlers for the `/api/projects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/projects` | Body: `{"name":"My Site"}`; 409 on duplicate name |
//! | `GET`  | `/api/projects` | |
//! | `GET`  | `/api/projects/:id` | 404 if not found |
//! | `GET`  | `/api/projects/:id/stats` | Optional `?days=N` window |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use beacon_core::{
  project::Project,
  store::{AnalyticsStore, PathCount},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Map a store failure onto API semantics: a duplicate project name is the
/// caller's conflict; everything else is internal.
fn into_api_error<E>(e: E) -> ApiError
where
  E: std::error::Error + Send + Sync + 'static,
{
  let mut cur: Option<&(dyn std::error::Error + 'static)> = Some(&e);
  while let Some(err) = cur {
    if let Some(beacon_core::Error::DuplicateProjectName(name)) =
      err.downcast_ref::<beacon_core::Error>()
    {
      return ApiError::Conflict(format!("a project named {name:?} already exists"));
    }
    cur = err.source();
  }
  ApiError::Store(Box::new(e))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /api/projects` — body: `{"name":"My Site"}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: AnalyticsStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let project = state
    .store
    .create_project(body.name)
    .await
    .map_err(into_api_error)?;
  Ok((StatusCode::CREATED, Json(project)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/projects`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Project>>, ApiError>
where
  S: AnalyticsStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let projects = state.store.list_projects().await.map_err(into_api_error)?;
  Ok(Json(projects))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/projects/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError>
where
  S: AnalyticsStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let project = state
    .store
    .get_project(id)
    .await
    .map_err(into_api_error)?
    .ok_or_else(|| ApiError::NotFound(format!("project {id} not found")))?;
  Ok(Json(project))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatsParams {
  /// Window in days; all-time when absent.
  pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProjectStats {
  pub views:        u64,
  pub unique_views: u64,
  pub top_paths:    Vec<PathCount>,
}

/// `GET /api/projects/:id/stats[?days=N]`
pub async fn stats<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<StatsParams>,
) -> Result<Json<ProjectStats>, ApiError>
where
  S: AnalyticsStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_project(id)
    .await
    .map_err(into_api_error)?
    .ok_or_else(|| ApiError::NotFound(format!("project {id} not found")))?;

  let since = params.days.and_then(Duration::try_days);

  let views = state
    .store
    .view_count(id, since)
    .await
    .map_err(into_api_error)?;
  let unique_views = state
    .store
    .unique_view_count(id, since)
    .await
    .map_err(into_api_error)?;
  let top_paths = state.store.top_paths(id).await.map_err(into_api_error)?;

  Ok(Json(ProjectStats { views, unique_views, top_paths }))
}
