//! Project — the entity a page view is attributed to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tracked site or application.
///
/// The tracking identifier is assigned once when the project is created and
/// never regenerated afterwards; it is globally unique across projects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
  pub project_id:  Uuid,
  pub name:        String,
  pub tracking_id: String,
  pub created_at:  DateTime<Utc>,
}
