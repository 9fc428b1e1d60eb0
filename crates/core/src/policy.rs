//! Path-based response policy.
//!
//! Classification is pure and computed from the URL at decision time:
//! - paths starting with the isolation prefix get the cross-origin isolation
//!   headers injected before they are cached or returned;
//! - paths ending with the exempt extension are large immutable assets that
//!   a bulk refresh never re-fetches.
//!
//! A URL can fall in both classes, in neither, or in one.

use url::Url;

use crate::cache::StoredResponse;

/// Header forced to `require-corp` on isolation-required responses.
pub const COEP_HEADER: &str = "cross-origin-embedder-policy";
/// Header forced to `same-origin` on isolation-required responses.
pub const COOP_HEADER: &str = "cross-origin-opener-policy";

pub const COEP_VALUE: &str = "require-corp";
pub const COOP_VALUE: &str = "same-origin";

/// Classification of a URL by its path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathClass {
    pub isolation_required: bool,
    pub refresh_exempt: bool,
}

/// Rules for classifying URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPolicy {
    isolation_prefix: String,
    exempt_extension: String,
}

impl PathPolicy {
    pub fn new(isolation_prefix: impl Into<String>, exempt_extension: impl Into<String>) -> Self {
        Self { isolation_prefix: isolation_prefix.into(), exempt_extension: exempt_extension.into() }
    }

    /// Classify a URL.
    ///
    /// The isolation prefix is a plain string prefix of the path, so
    /// `/Digita` also matches `/DigitaAssets/x`. The extension check is
    /// case-insensitive and ignores the query string.
    pub fn classify(&self, url: &Url) -> PathClass {
        let path = url.path();
        PathClass {
            isolation_required: path.starts_with(&self.isolation_prefix),
            refresh_exempt: ends_with_ignore_case(path, &self.exempt_extension),
        }
    }

    /// Apply the isolation rewrite if the URL calls for it.
    pub fn apply(&self, url: &Url, response: StoredResponse) -> StoredResponse {
        if self.classify(url).isolation_required {
            rewrite_isolation_headers(response)
        } else {
            response
        }
    }
}

fn ends_with_ignore_case(haystack: &str, suffix: &str) -> bool {
    haystack.len() >= suffix.len()
        && haystack
            .get(haystack.len() - suffix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(suffix))
}

/// Build a new response with the two cross-origin isolation headers forced
/// to their fixed values.
///
/// Status, status text and body are carried over unchanged. Any existing
/// values for the two headers are dropped; every other header keeps its
/// position and value.
pub fn rewrite_isolation_headers(response: StoredResponse) -> StoredResponse {
    let (status, status_text, headers, body) = response.into_parts();

    let kept = headers
        .into_iter()
        .filter(|(name, _)| !name.eq_ignore_ascii_case(COEP_HEADER) && !name.eq_ignore_ascii_case(COOP_HEADER));

    StoredResponse::new(status, status_text)
        .with_headers(kept)
        .with_header(COEP_HEADER, COEP_VALUE)
        .with_header(COOP_HEADER, COOP_VALUE)
        .with_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PathPolicy {
        PathPolicy::new("/Digita", ".vrm")
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_classify_isolation_prefix() {
        let class = policy().classify(&url("https://example.com/Digita/app.js"));
        assert!(class.isolation_required);
        assert!(!class.refresh_exempt);
    }

    #[test]
    fn test_classify_prefix_is_plain_string_prefix() {
        assert!(policy().classify(&url("https://example.com/DigitaAssets/x")).isolation_required);
        assert!(!policy().classify(&url("https://example.com/assets/Digita/x")).isolation_required);
        assert!(!policy().classify(&url("https://example.com/digita/x")).isolation_required);
    }

    #[test]
    fn test_classify_exempt_extension() {
        assert!(policy().classify(&url("https://example.com/models/avatar.vrm")).refresh_exempt);
        assert!(policy().classify(&url("https://example.com/models/avatar.VRM")).refresh_exempt);
        assert!(policy().classify(&url("https://example.com/models/avatar.vrm?v=3")).refresh_exempt);
        assert!(!policy().classify(&url("https://example.com/models/avatar.vrm.json")).refresh_exempt);
        assert!(!policy().classify(&url("https://example.com/index")).refresh_exempt);
    }

    #[test]
    fn test_exempt_extension_only_at_end_of_path() {
        assert!(!policy().classify(&url("https://example.com/load?file=a.vrm")).refresh_exempt);
        assert!(!policy().classify(&url("https://example.com/models.vrm/x")).refresh_exempt);
        assert!(!policy().classify(&url("https://example.com/page#a.vrm")).refresh_exempt);
    }

    #[test]
    fn test_classify_both() {
        let class = policy().classify(&url("https://example.com/Digita/models/a.vrm"));
        assert_eq!(class, PathClass { isolation_required: true, refresh_exempt: true });
    }

    #[test]
    fn test_rewrite_overrides_existing_values() {
        let response = StoredResponse::new(200, "OK")
            .with_header("Content-Type", "text/javascript")
            .with_header("Cross-Origin-Embedder-Policy", "unsafe-none")
            .with_header("cross-origin-opener-policy", "unsafe-none")
            .with_header("Cross-Origin-Opener-Policy", "same-origin-allow-popups")
            .with_body("console.log(1)");

        let rewritten = rewrite_isolation_headers(response);

        assert_eq!(rewritten.status(), 200);
        assert_eq!(rewritten.status_text(), "OK");
        assert_eq!(rewritten.body().as_ref(), b"console.log(1)");
        assert_eq!(rewritten.header(COEP_HEADER), Some("require-corp"));
        assert_eq!(rewritten.header(COOP_HEADER), Some("same-origin"));
        assert_eq!(rewritten.header("content-type"), Some("text/javascript"));
        assert_eq!(rewritten.headers().len(), 3);
    }

    #[test]
    fn test_rewrite_adds_when_absent() {
        let rewritten = rewrite_isolation_headers(StoredResponse::new(201, "Created"));
        assert_eq!(
            rewritten.headers(),
            &[
                (COEP_HEADER.to_string(), COEP_VALUE.to_string()),
                (COOP_HEADER.to_string(), COOP_VALUE.to_string()),
            ]
        );
        assert_eq!(rewritten.status(), 201);
    }

    #[test]
    fn test_apply_leaves_other_paths_alone() {
        let response = StoredResponse::new(200, "OK").with_header("x-a", "1");
        let applied = policy().apply(&url("https://example.com/settings"), response.clone());
        assert_eq!(applied, response);
    }
}
