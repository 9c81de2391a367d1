//! The `AnalyticsStore` trait — the seam between the decision logic and the
//! storage backend.
//!
//! The trait is implemented by storage backends (e.g. `beacon-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::Duration;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  page_view::{NewPageView, PageView},
  project::Project,
  tracking_id,
};

// ─── Query result types ──────────────────────────────────────────────────────

/// One row of a top-paths report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathCount {
  pub path:  String,
  pub views: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a tracker storage backend.
///
/// Page views are append-only; no update or delete is exposed. Tracking-id
/// uniqueness is enforced by the backend (a unique index), with
/// [`create_project`](Self::create_project) regenerating on collision.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait AnalyticsStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Projects ──────────────────────────────────────────────────────────

  /// Create and persist a project with a freshly generated tracking
  /// identifier, regenerating (bounded) when the identifier collides with
  /// an existing one.
  fn create_project(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Project, Self::Error>> + Send + '_;

  /// Retrieve a project by id. Returns `None` if not found.
  fn get_project(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + '_;

  /// Look up the project owning `tid`. Returns `None` for unknown ids.
  fn project_by_tracking_id<'a>(
    &'a self,
    tid: &'a str,
  ) -> impl Future<Output = Result<Option<Project>, Self::Error>> + Send + 'a;

  /// List all projects.
  fn list_projects(
    &self,
  ) -> impl Future<Output = Result<Vec<Project>, Self::Error>> + Send + '_;

  // ── Page views — append-only writes ───────────────────────────────────

  /// Persist one immutable page-view record. The id and timestamp are
  /// assigned by the store.
  fn record_page_view(
    &self,
    input: NewPageView,
  ) -> impl Future<Output = Result<PageView, Self::Error>> + Send + '_;

  // ── Aggregate reads ───────────────────────────────────────────────────

  /// Count of the project's page views with `timestamp >= now - since`;
  /// all-time when `since` is `None`.
  fn view_count(
    &self,
    project_id: Uuid,
    since: Option<Duration>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Same window as [`view_count`](Self::view_count), unique visits only.
  fn unique_view_count(
    &self,
    project_id: Uuid,
    since: Option<Duration>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// The project's paths grouped and counted, most visited first, ties
  /// broken by path. Empty when the project has no page views.
  fn top_paths(
    &self,
    project_id: Uuid,
  ) -> impl Future<Output = Result<Vec<PathCount>, Self::Error>> + Send + '_;
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// True iff `tid` is present, well-formed, and names an existing project.
///
/// All three conditions are required; malformed and unknown identifiers are
/// deliberately indistinguishable to callers, so the check never reveals
/// which one failed.
pub async fn is_valid_tracking_id<S>(
  store: &S,
  tid: Option<&str>,
) -> Result<bool, S::Error>
where
  S: AnalyticsStore,
{
  let Some(tid) = tid else { return Ok(false) };
  if !tracking_id::is_well_formed(tid) {
    return Ok(false);
  }
  Ok(store.project_by_tracking_id(tid).await?.is_some())
}
