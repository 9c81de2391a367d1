//! Integration tests for `SqliteStore` against an in-memory database.

use beacon_core::{
  attributes::PageAttributes,
  page_view::NewPageView,
  store::{AnalyticsStore, is_valid_tracking_id},
  tracking_id,
};
use chrono::Duration;
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn page_view(project_id: Uuid, path: &str, unique: bool) -> NewPageView {
  NewPageView {
    project_id,
    attributes: PageAttributes {
      protocol:      "http".into(),
      domain:        "example.com".into(),
      path:          path.into(),
      url:           format!("http://example.com{path}"),
      title:         String::new(),
      window_width:  0,
      window_height: 0,
    },
    referer: String::new(),
    unique_visit: unique,
  }
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_project() {
  let s = store().await;

  let project = s.create_project("Test Project".into()).await.unwrap();
  assert_eq!(project.name, "Test Project");
  assert!(tracking_id::is_well_formed(&project.tracking_id));

  let fetched = s.get_project(project.project_id).await.unwrap().unwrap();
  assert_eq!(fetched.project_id, project.project_id);
  assert_eq!(fetched.tracking_id, project.tracking_id);
  assert_eq!(fetched.name, "Test Project");
}

#[tokio::test]
async fn created_project_round_trips_through_validation() {
  let s = store().await;
  let project = s.create_project("Round Trip".into()).await.unwrap();

  assert!(!project.tracking_id.is_empty());
  assert!(
    is_valid_tracking_id(&s, Some(&project.tracking_id))
      .await
      .unwrap()
  );
}

#[tokio::test]
async fn get_project_missing_returns_none() {
  let s = store().await;
  let result = s.get_project(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn duplicate_project_name_errors() {
  let s = store().await;
  s.create_project("Same Name".into()).await.unwrap();

  let err = s.create_project("Same Name".into()).await.unwrap_err();
  assert!(matches!(
    err,
    crate::Error::Core(beacon_core::Error::DuplicateProjectName(ref n)) if n == "Same Name"
  ));
}

#[tokio::test]
async fn tracking_ids_are_unique_across_projects() {
  let s = store().await;
  let a = s.create_project("A".into()).await.unwrap();
  let b = s.create_project("B".into()).await.unwrap();
  assert_ne!(a.tracking_id, b.tracking_id);
}

#[tokio::test]
async fn project_by_tracking_id_unknown_returns_none() {
  let s = store().await;
  s.create_project("Known".into()).await.unwrap();

  let result = s.project_by_tracking_id("PA-ZZZZZZZZZ").await.unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn validation_rejects_absent_malformed_and_unknown_ids() {
  let s = store().await;
  let project = s.create_project("Validation".into()).await.unwrap();

  assert!(!is_valid_tracking_id(&s, None).await.unwrap());
  assert!(!is_valid_tracking_id(&s, Some("TESTING")).await.unwrap());
  // Format-valid but with a trailing character.
  let trailing = format!("{}0", project.tracking_id);
  assert!(!is_valid_tracking_id(&s, Some(&trailing)).await.unwrap());
  // Format-valid but no such project.
  assert!(!is_valid_tracking_id(&s, Some("PA-ZZZZZZZZZ")).await.unwrap());
}

#[tokio::test]
async fn list_projects_returns_all() {
  let s = store().await;
  s.create_project("First".into()).await.unwrap();
  s.create_project("Second".into()).await.unwrap();

  let all = s.list_projects().await.unwrap();
  assert_eq!(all.len(), 2);
}

// ─── Page views ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_page_view_and_read_back_through_counts() {
  let s = store().await;
  let project = s.create_project("Views".into()).await.unwrap();

  let view = s
    .record_page_view(page_view(project.project_id, "/about", true))
    .await
    .unwrap();
  assert_eq!(view.project_id, project.project_id);
  assert_eq!(view.path, "/about");

  assert_eq!(s.view_count(project.project_id, None).await.unwrap(), 1);
}

#[tokio::test]
async fn counts_do_not_cross_project_boundaries() {
  let s = store().await;
  let a = s.create_project("A".into()).await.unwrap();
  let b = s.create_project("B".into()).await.unwrap();

  s.record_page_view(page_view(a.project_id, "/x", true)).await.unwrap();
  s.record_page_view(page_view(a.project_id, "/y", true)).await.unwrap();
  s.record_page_view(page_view(b.project_id, "/x", true)).await.unwrap();

  assert_eq!(s.view_count(a.project_id, None).await.unwrap(), 2);
  assert_eq!(s.view_count(b.project_id, None).await.unwrap(), 1);
}

#[tokio::test]
async fn unique_view_count_filters_repeat_visits() {
  let s = store().await;
  let project = s.create_project("Uniques".into()).await.unwrap();

  s.record_page_view(page_view(project.project_id, "/a", true)).await.unwrap();
  s.record_page_view(page_view(project.project_id, "/a", false)).await.unwrap();
  s.record_page_view(page_view(project.project_id, "/b", true)).await.unwrap();

  assert_eq!(s.view_count(project.project_id, None).await.unwrap(), 3);
  assert_eq!(s.unique_view_count(project.project_id, None).await.unwrap(), 2);
}

#[tokio::test]
async fn windowed_counts_exclude_older_views() {
  let s = store().await;
  let project = s.create_project("Windowed".into()).await.unwrap();

  let old = s
    .record_page_view(page_view(project.project_id, "/old", true))
    .await
    .unwrap();
  s.record_page_view(page_view(project.project_id, "/new", true)).await.unwrap();

  // Backdate one row well past the query window.
  s.backdate_page_view(old.page_view_id, "2001-01-01T00:00:00+00:00")
    .await
    .unwrap();

  assert_eq!(s.view_count(project.project_id, None).await.unwrap(), 2);
  assert_eq!(
    s.view_count(project.project_id, Some(Duration::days(7))).await.unwrap(),
    1
  );
  assert_eq!(
    s.unique_view_count(project.project_id, Some(Duration::days(7)))
      .await
      .unwrap(),
    1
  );
}

// ─── Top paths ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn top_paths_orders_by_count_descending() {
  let s = store().await;
  let project = s.create_project("Paths".into()).await.unwrap();

  for _ in 0..3 {
    s.record_page_view(page_view(project.project_id, "/a", true)).await.unwrap();
  }
  s.record_page_view(page_view(project.project_id, "/b", true)).await.unwrap();

  let top = s.top_paths(project.project_id).await.unwrap();
  assert_eq!(top.len(), 2);
  assert_eq!(top[0].path, "/a");
  assert_eq!(top[0].views, 3);
  assert_eq!(top[1].path, "/b");
  assert_eq!(top[1].views, 1);
}

#[tokio::test]
async fn top_paths_ties_break_by_path() {
  let s = store().await;
  let project = s.create_project("Ties".into()).await.unwrap();

  s.record_page_view(page_view(project.project_id, "/z", true)).await.unwrap();
  s.record_page_view(page_view(project.project_id, "/a", true)).await.unwrap();

  let top = s.top_paths(project.project_id).await.unwrap();
  assert_eq!(top[0].path, "/a");
  assert_eq!(top[1].path, "/z");
}

#[tokio::test]
async fn top_paths_empty_project_returns_empty() {
  let s = store().await;
  let project = s.create_project("Fresh".into()).await.unwrap();

  let top = s.top_paths(project.project_id).await.unwrap();
  assert!(top.is_empty());
}
