//! HTTP layer for the beacon page-view tracker.
//!
//! Exposes an axum [`Router`] with the two tracking endpoints — the snippet
//! script (`/a.js`) and the collection pixel (`/a.gif`) — plus a small JSON
//! API for managing projects and reading aggregates, backed by any
//! [`AnalyticsStore`]. TLS and reverse-proxy concerns are the deployment's
//! responsibility.

pub mod error;
pub mod projects;
pub mod snippet;
pub mod tracker;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use beacon_core::store::AnalyticsStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// Origin substituted into the tracking snippet,
  /// e.g. `https://stats.example.com`.
  pub public_url: String,
  pub store_path: PathBuf,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: AnalyticsStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the tracker.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: AnalyticsStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Tracking surface
    .route("/a.js",  get(tracker::script::<S>))
    .route("/a.gif", get(tracker::collect::<S>))
    // Operator API
    .route("/api/projects", get(projects::list::<S>).post(projects::create::<S>))
    .route("/api/projects/{id}", get(projects::get_one::<S>))
    .route("/api/projects/{id}/stats", get(projects::stats::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
