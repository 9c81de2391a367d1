//! Visit classification and referrer attribution.

use url::Url;

use crate::attributes::netloc;

/// A visit is unique when the referrer's network location differs from the
/// tracked page's — traffic arriving from outside the site's own domain.
/// No referrer at all (or one that does not parse) counts as unique.
pub fn is_unique_visit(tracked_url: &str, referer: Option<&str>) -> bool {
  netloc(referer.unwrap_or_default()) != netloc(tracked_url)
}

/// Resolve the attribution string for a page view.
///
/// An explicit browser referrer always wins. Failing that, the tracked
/// URL's own query string is scanned for a `ref=` campaign tag (email
/// campaigns and the like embed one in the landing URL); failing both, the
/// attribution is empty.
pub fn resolve_referer(tracked_url: &str, referer: Option<&str>) -> String {
  if let Some(r) = referer
    && !r.is_empty()
  {
    return r.to_string();
  }

  let query = Url::parse(tracked_url)
    .ok()
    .and_then(|u| u.query().map(str::to_string))
    .unwrap_or_default();

  scan_source_tag(&query).unwrap_or_default()
}

/// First non-whitespace run following the literal `ref=` in `query`.
///
/// This is a substring scan, not query-parameter parsing: it will also match
/// a `ref=` appearing inside an unrelated parameter value. Kept that way for
/// compatibility with snippets already in the wild.
fn scan_source_tag(query: &str) -> Option<String> {
  let start = query.find("ref=")? + "ref=".len();
  let tail = &query[start..];
  let end = tail.find(char::is_whitespace).unwrap_or(tail.len());
  Some(tail[..end].to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  // ── Uniqueness ──────────────────────────────────────────────────────────

  #[test]
  fn same_domain_referer_is_not_unique() {
    assert!(!is_unique_visit(
      "http://example.com/about",
      Some("http://example.com"),
    ));
  }

  #[test]
  fn external_referer_is_unique() {
    assert!(is_unique_visit(
      "http://example.com/about",
      Some("http://other.com"),
    ));
  }

  #[test]
  fn absent_or_empty_referer_is_unique() {
    assert!(is_unique_visit("http://example.com/about", None));
    assert!(is_unique_visit("http://example.com/about", Some("")));
  }

  #[test]
  fn same_host_different_port_is_unique() {
    assert!(is_unique_visit(
      "http://example.com:8080/x",
      Some("http://example.com/y"),
    ));
  }

  // ── Attribution ─────────────────────────────────────────────────────────

  #[test]
  fn explicit_referer_wins_over_campaign_tag() {
    let resolved = resolve_referer(
      "http://example.com/?ref=email",
      Some("http://refer.com"),
    );
    assert_eq!(resolved, "http://refer.com");
  }

  #[test]
  fn campaign_tag_used_when_no_referer() {
    assert_eq!(resolve_referer("http://example.com/?ref=email", None), "email");
  }

  #[test]
  fn campaign_tag_matches_inside_other_values() {
    // The scan is a raw substring match; `href=x` contains `ref=x`.
    assert_eq!(resolve_referer("http://example.com/?href=x", None), "x");
  }

  #[test]
  fn empty_campaign_tag_resolves_empty() {
    assert_eq!(resolve_referer("http://example.com/?ref=", None), "");
  }

  #[test]
  fn no_referer_and_no_tag_resolves_empty() {
    assert_eq!(resolve_referer("http://example.com/about", None), "");
    assert_eq!(resolve_referer("http://example.com/about", Some("")), "");
  }
}
