//! SQL schema for the beacon SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// The UNIQUE index on `tracking_id` is the correctness backstop for
/// identifier allocation: the registry's generate-and-retry loop only
/// reacts to violations of this constraint.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS projects (
    project_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    tracking_id TEXT UNIQUE,      -- 'PA-' + 9 x [A-Z0-9]; assigned at creation
    created_at  TEXT NOT NULL     -- ISO 8601 UTC; server-assigned
);

-- Page views are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS page_views (
    page_view_id  TEXT PRIMARY KEY,
    project_id    TEXT NOT NULL REFERENCES projects(project_id),
    timestamp     TEXT NOT NULL,  -- ISO 8601 UTC; server-assigned
    protocol      TEXT NOT NULL DEFAULT '',
    domain        TEXT NOT NULL DEFAULT '',
    path          TEXT NOT NULL DEFAULT '',
    url           TEXT NOT NULL,
    title         TEXT NOT NULL DEFAULT '',
    window_width  INTEGER NOT NULL DEFAULT 0,
    window_height INTEGER NOT NULL DEFAULT 0,
    referer       TEXT NOT NULL DEFAULT '',
    unique_visit  INTEGER NOT NULL -- 0 | 1
);

CREATE INDEX IF NOT EXISTS page_views_project_idx   ON page_views(project_id);
CREATE INDEX IF NOT EXISTS page_views_timestamp_idx ON page_views(timestamp);
CREATE INDEX IF NOT EXISTS page_views_path_idx      ON page_views(project_id, path);

PRAGMA user_version = 1;
";
