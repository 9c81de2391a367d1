//! Extraction and normalisation of page-view attributes from the collect
//! query parameters.

use serde::Deserialize;
use url::Url;

// ─── Wire parameters ─────────────────────────────────────────────────────────

/// The raw collect query parameters as sent by the tracking snippet.
///
/// Field names follow the wire format: `t` is the page title, `wiw`/`wih`
/// the window dimensions. Everything is optional at this layer; presence
/// requirements belong to the collect flow.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectParams {
  pub tid:           Option<String>,
  pub url:           Option<String>,
  #[serde(rename = "ref")]
  pub referer:       Option<String>,
  #[serde(rename = "t")]
  pub title:         Option<String>,
  #[serde(rename = "wiw")]
  pub window_width:  Option<String>,
  #[serde(rename = "wih")]
  pub window_height: Option<String>,
}

// ─── Structured attributes ───────────────────────────────────────────────────

/// Attributes derived from [`CollectParams`], ready to persist.
#[derive(Debug, Clone)]
pub struct PageAttributes {
  pub protocol:      String,
  pub domain:        String,
  pub path:          String,
  pub url:           String,
  pub title:         String,
  pub window_width:  u32,
  pub window_height: u32,
}

impl PageAttributes {
  /// Derive structured attributes from the raw parameters.
  ///
  /// The tracked URL is decomposed with standard URL syntax; a value that is
  /// not an absolute URL degrades to empty scheme/host/path while the raw
  /// string is kept in `url`. Missing optional fields default instead of
  /// erroring.
  pub fn parse(params: &CollectParams) -> Self {
    let raw_url = params.url.clone().unwrap_or_default();
    let (protocol, domain, path) = match Url::parse(&raw_url) {
      Ok(u) => (u.scheme().to_string(), netloc_of(&u), u.path().to_string()),
      Err(_) => (String::new(), String::new(), String::new()),
    };

    PageAttributes {
      protocol,
      domain,
      path,
      url: raw_url,
      title: params.title.clone().unwrap_or_default(),
      window_width: parse_dimension(params.window_width.as_deref()),
      window_height: parse_dimension(params.window_height.as_deref()),
    }
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn netloc_of(url: &Url) -> String {
  let host = url.host_str().unwrap_or_default();
  match url.port() {
    Some(p) => format!("{host}:{p}"),
    None => host.to_string(),
  }
}

/// The network-location component (host[:port]) of a raw URL string; empty
/// when the string is empty or not an absolute URL.
pub fn netloc(raw: &str) -> String {
  Url::parse(raw).map(|u| netloc_of(&u)).unwrap_or_default()
}

/// Viewport dimensions degrade to 0 when absent or when the value does not
/// parse as a non-negative integer; ingestion never fails on these fields.
fn parse_dimension(raw: Option<&str>) -> u32 {
  raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn params(url: &str) -> CollectParams {
    CollectParams {
      url: Some(url.to_string()),
      ..Default::default()
    }
  }

  #[test]
  fn decomposes_a_tracked_url() {
    let attrs = PageAttributes::parse(&params("https://example.com/about?x=1"));
    assert_eq!(attrs.protocol, "https");
    assert_eq!(attrs.domain, "example.com");
    assert_eq!(attrs.path, "/about");
    assert_eq!(attrs.url, "https://example.com/about?x=1");
  }

  #[test]
  fn keeps_an_explicit_port_in_the_domain() {
    let attrs = PageAttributes::parse(&params("http://example.com:8080/"));
    assert_eq!(attrs.domain, "example.com:8080");
  }

  #[test]
  fn unparseable_url_degrades_but_is_kept_verbatim() {
    let attrs = PageAttributes::parse(&params("not a url"));
    assert_eq!(attrs.protocol, "");
    assert_eq!(attrs.domain, "");
    assert_eq!(attrs.path, "");
    assert_eq!(attrs.url, "not a url");
  }

  #[test]
  fn optional_fields_default() {
    let attrs = PageAttributes::parse(&params("http://example.com/"));
    assert_eq!(attrs.title, "");
    assert_eq!(attrs.window_width, 0);
    assert_eq!(attrs.window_height, 0);
  }

  #[test]
  fn dimensions_parse_when_numeric() {
    let mut p = params("http://example.com/");
    p.window_width = Some("1272".to_string());
    p.window_height = Some("675".to_string());
    let attrs = PageAttributes::parse(&p);
    assert_eq!(attrs.window_width, 1272);
    assert_eq!(attrs.window_height, 675);
  }

  #[test]
  fn non_numeric_dimensions_coerce_to_zero() {
    let mut p = params("http://example.com/");
    p.window_width = Some("wide".to_string());
    p.window_height = Some("-40".to_string());
    let attrs = PageAttributes::parse(&p);
    assert_eq!(attrs.window_width, 0);
    assert_eq!(attrs.window_height, 0);
  }

  #[test]
  fn netloc_of_raw_strings() {
    assert_eq!(netloc("http://example.com/about"), "example.com");
    assert_eq!(netloc("http://example.com:9000/x"), "example.com:9000");
    assert_eq!(netloc(""), "");
    assert_eq!(netloc("garbage"), "");
  }
}
