//! Page-view records.
//!
//! A page view is created exactly once per accepted collection request and
//! is never updated or deleted afterwards; the store exposes no mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attributes::PageAttributes;

/// One recorded page view, attributed to exactly one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView {
  pub page_view_id:  Uuid,
  pub project_id:    Uuid,
  /// Server-assigned creation time.
  pub timestamp:     DateTime<Utc>,
  pub protocol:      String,
  pub domain:        String,
  pub path:          String,
  pub url:           String,
  pub title:         String,
  pub window_width:  u32,
  pub window_height: u32,
  /// Resolved attribution — browser referrer or embedded campaign tag.
  pub referer:       String,
  /// Computed once at creation; immutable thereafter.
  pub unique_visit:  bool,
}

/// Input for [`record_page_view`](crate::store::AnalyticsStore::record_page_view);
/// the id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewPageView {
  pub project_id:   Uuid,
  pub attributes:   PageAttributes,
  pub referer:      String,
  pub unique_visit: bool,
}
