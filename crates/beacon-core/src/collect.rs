//! The collect flow — Do-Not-Track gating, validation, and ingestion.

use crate::{
  attributes::{CollectParams, PageAttributes},
  page_view::{NewPageView, PageView},
  store::AnalyticsStore,
  tracking_id,
  visit::{is_unique_visit, resolve_referer},
};

/// True iff the client sent the `dnt` header with the exact value `"1"`.
/// An absent header, `"0"`, or any other value leaves tracking enabled.
pub fn is_tracking_disallowed(dnt: Option<&str>) -> bool {
  dnt == Some("1")
}

/// What happened to a single collection request.
///
/// Skips are ordinary outcomes, not errors: the HTTP boundary answers every
/// variant with the identical pixel response, so neither the embedding page
/// nor its network inspector can tell them apart.
#[derive(Debug, Clone)]
pub enum CollectOutcome {
  Recorded(PageView),
  SkippedDnt,
  SkippedMissingUrl,
  SkippedInvalidProject,
}

/// Run one collection request through the decision pipeline.
///
/// Checks run cheapest-first: DNT, then `url` presence, then tracking-id
/// format and existence — the only check that touches the store. Only
/// storage failures propagate as errors.
pub async fn ingest<S>(
  store: &S,
  params: &CollectParams,
  dnt: Option<&str>,
) -> Result<CollectOutcome, S::Error>
where
  S: AnalyticsStore,
{
  if is_tracking_disallowed(dnt) {
    return Ok(CollectOutcome::SkippedDnt);
  }

  let Some(url) = params.url.as_deref().filter(|u| !u.is_empty()) else {
    return Ok(CollectOutcome::SkippedMissingUrl);
  };

  let project = match params.tid.as_deref() {
    Some(tid) if tracking_id::is_well_formed(tid) => {
      store.project_by_tracking_id(tid).await?
    }
    _ => None,
  };
  let Some(project) = project else {
    return Ok(CollectOutcome::SkippedInvalidProject);
  };

  let attributes = PageAttributes::parse(params);
  let unique_visit = is_unique_visit(url, params.referer.as_deref());
  let referer = resolve_referer(url, params.referer.as_deref());

  let view = store
    .record_page_view(NewPageView {
      project_id: project.project_id,
      attributes,
      referer,
      unique_visit,
    })
    .await?;

  Ok(CollectOutcome::Recorded(view))
}
