//! [`SqliteStore`] — the SQLite implementation of [`AnalyticsStore`].

use std::path::Path;

use beacon_core::{
  page_view::{NewPageView, PageView},
  project::Project,
  store::{AnalyticsStore, PathCount},
  tracking_id,
};
use chrono::{Duration, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  encode::{RawProject, encode_dt, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

/// Inserts attempted with freshly generated tracking ids before giving up.
/// Each retry only happens after the UNIQUE index rejected the previous id,
/// so reaching the bound means something other than bad luck is wrong.
const TRACKING_ID_ATTEMPTS: u32 = 5;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A beacon analytics store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Count page views for a project, optionally windowed and optionally
  /// restricted to unique visits.
  async fn count_views(
    &self,
    project_id: Uuid,
    since: Option<Duration>,
    unique_only: bool,
  ) -> Result<u64> {
    let id_str = encode_uuid(project_id);
    let cutoff = since.map(|d| encode_dt(Utc::now() - d));

    let n: i64 = self
      .conn
      .call(move |conn| {
        let unique_clause = if unique_only { " AND unique_visit = 1" } else { "" };
        let n = match cutoff {
          Some(ts) => conn.query_row(
            &format!(
              "SELECT COUNT(*) FROM page_views
               WHERE project_id = ?1 AND timestamp >= ?2{unique_clause}"
            ),
            rusqlite::params![id_str, ts],
            |r| r.get(0),
          )?,
          None => conn.query_row(
            &format!(
              "SELECT COUNT(*) FROM page_views WHERE project_id = ?1{unique_clause}"
            ),
            rusqlite::params![id_str],
            |r| r.get(0),
          )?,
        };
        Ok(n)
      })
      .await?;

    Ok(n as u64)
  }

  /// Rewrite a page view's timestamp so window queries can be exercised
  /// without waiting. Test-only; the public API never updates page views.
  #[cfg(test)]
  pub(crate) async fn backdate_page_view(
    &self,
    id: Uuid,
    timestamp: &str,
  ) -> Result<()> {
    let id_str = encode_uuid(id);
    let ts = timestamp.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE page_views SET timestamp = ?1 WHERE page_view_id = ?2",
          rusqlite::params![ts, id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Constraint classification ───────────────────────────────────────────────

enum ConstraintTarget {
  ProjectName,
  TrackingId,
}

/// Identify which UNIQUE constraint a failed insert violated, if any.
fn constraint_target(err: &tokio_rusqlite::Error) -> Option<ConstraintTarget> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, Some(msg))) =
    err
  else {
    return None;
  };
  if code.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }
  if msg.contains("projects.name") {
    Some(ConstraintTarget::ProjectName)
  } else if msg.contains("projects.tracking_id") {
    Some(ConstraintTarget::TrackingId)
  } else {
    None
  }
}

// ─── AnalyticsStore impl ─────────────────────────────────────────────────────

impl AnalyticsStore for SqliteStore {
  type Error = Error;

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn create_project(&self, name: String) -> Result<Project> {
    for _ in 0..TRACKING_ID_ATTEMPTS {
      let project = Project {
        project_id:  Uuid::new_v4(),
        name:        name.clone(),
        tracking_id: tracking_id::generate(),
        created_at:  Utc::now(),
      };

      let id_str   = encode_uuid(project.project_id);
      let name_str = project.name.clone();
      let tid_str  = project.tracking_id.clone();
      let at_str   = encode_dt(project.created_at);

      let inserted = self
        .conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO projects (project_id, name, tracking_id, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id_str, name_str, tid_str, at_str],
          )?;
          Ok(())
        })
        .await;

      match inserted {
        Ok(()) => return Ok(project),
        Err(e) => match constraint_target(&e) {
          Some(ConstraintTarget::ProjectName) => {
            return Err(beacon_core::Error::DuplicateProjectName(name).into());
          }
          // The generated id is already taken; the unique index is the
          // arbiter, so generate a new one and try again.
          Some(ConstraintTarget::TrackingId) => continue,
          None => return Err(e.into()),
        },
      }
    }

    Err(beacon_core::Error::TrackingIdExhausted(TRACKING_ID_ATTEMPTS).into())
  }

  async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT project_id, name, tracking_id, created_at
               FROM projects WHERE project_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawProject {
                  project_id:  row.get(0)?,
                  name:        row.get(1)?,
                  tracking_id: row.get(2)?,
                  created_at:  row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProject::into_project).transpose()
  }

  async fn project_by_tracking_id(&self, tid: &str) -> Result<Option<Project>> {
    let tid = tid.to_owned();

    let raw: Option<RawProject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT project_id, name, tracking_id, created_at
               FROM projects WHERE tracking_id = ?1",
              rusqlite::params![tid],
              |row| {
                Ok(RawProject {
                  project_id:  row.get(0)?,
                  name:        row.get(1)?,
                  tracking_id: row.get(2)?,
                  created_at:  row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProject::into_project).transpose()
  }

  async fn list_projects(&self) -> Result<Vec<Project>> {
    let raws: Vec<RawProject> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT project_id, name, tracking_id, created_at
           FROM projects ORDER BY created_at",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawProject {
              project_id:  row.get(0)?,
              name:        row.get(1)?,
              tracking_id: row.get(2)?,
              created_at:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProject::into_project).collect()
  }

  // ── Page views — append-only writes ───────────────────────────────────────

  async fn record_page_view(&self, input: NewPageView) -> Result<PageView> {
    let attrs = input.attributes;
    let view = PageView {
      page_view_id:  Uuid::new_v4(),
      project_id:    input.project_id,
      timestamp:     Utc::now(),
      protocol:      attrs.protocol,
      domain:        attrs.domain,
      path:          attrs.path,
      url:           attrs.url,
      title:         attrs.title,
      window_width:  attrs.window_width,
      window_height: attrs.window_height,
      referer:       input.referer,
      unique_visit:  input.unique_visit,
    };

    let id_str      = encode_uuid(view.page_view_id);
    let project_str = encode_uuid(view.project_id);
    let at_str      = encode_dt(view.timestamp);
    let protocol    = view.protocol.clone();
    let domain      = view.domain.clone();
    let path        = view.path.clone();
    let url         = view.url.clone();
    let title       = view.title.clone();
    let width       = view.window_width;
    let height      = view.window_height;
    let referer     = view.referer.clone();
    let unique      = view.unique_visit;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO page_views (
             page_view_id, project_id, timestamp, protocol, domain, path,
             url, title, window_width, window_height, referer, unique_visit
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            id_str,
            project_str,
            at_str,
            protocol,
            domain,
            path,
            url,
            title,
            width,
            height,
            referer,
            unique,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(view)
  }

  // ── Aggregate reads ───────────────────────────────────────────────────────

  async fn view_count(&self, project_id: Uuid, since: Option<Duration>) -> Result<u64> {
    self.count_views(project_id, since, false).await
  }

  async fn unique_view_count(
    &self,
    project_id: Uuid,
    since: Option<Duration>,
  ) -> Result<u64> {
    self.count_views(project_id, since, true).await
  }

  async fn top_paths(&self, project_id: Uuid) -> Result<Vec<PathCount>> {
    let id_str = encode_uuid(project_id);

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT path, COUNT(*) AS views
           FROM page_views
           WHERE project_id = ?1
           GROUP BY path
           ORDER BY views DESC, path ASC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok((row.get(0)?, row.get(1)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      rows
        .into_iter()
        .map(|(path, views)| PathCount { path, views: views as u64 })
        .collect(),
    )
  }
}
