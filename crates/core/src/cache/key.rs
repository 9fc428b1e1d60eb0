//! Request identity used to look up and store responses.

use sha2::{Digest, Sha256};
use url::Url;

use crate::Error;
use crate::url::canonicalize;

/// Identity of a request within a cache store.
///
/// Two requests with the same method and canonical URL map to the same key,
/// whatever object they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: String,
    url: Url,
}

impl RequestKey {
    /// Build a key from a method and an absolute URL.
    ///
    /// The method is uppercased and the URL canonicalized (fragment dropped,
    /// host lowercased).
    pub fn new(method: &str, url: &str) -> Result<Self, Error> {
        let method = method.trim().to_ascii_uppercase();
        if method.is_empty() || !method.bytes().all(is_token_byte) {
            return Err(Error::InvalidInput(format!("invalid HTTP method: {method:?}")));
        }

        let url = canonicalize(url)?;
        Ok(Self { method, url })
    }

    /// Key for a GET of an already canonical URL.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Content-addressed form of the key used as the storage row id.
    pub fn hash(&self) -> String {
        compute_key_hash(&self.method, self.url.as_str())
    }

    /// Rebuild a key from stored columns.
    pub(crate) fn from_row(method: String, url: &str) -> Result<Self, Error> {
        let url = Url::parse(url).map_err(|e| Error::CorruptEntry(format!("stored url {url:?}: {e}")))?;
        Ok(Self { method, url })
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// Compute the content-addressed hash of a request identity.
pub fn compute_key_hash(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_key_hash("GET", "https://example.com/");
        let hash2 = compute_key_hash("GET", "https://example.com/");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_different_method() {
        let get = compute_key_hash("GET", "https://example.com/");
        let head = compute_key_hash("HEAD", "https://example.com/");
        assert_ne!(get, head);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_key_hash("GET", "https://example.com/");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_logically_identical_requests_share_key() {
        let a = RequestKey::new("get", "https://Example.com/index#top").unwrap();
        let b = RequestKey::new("GET", "https://example.com/index").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_query_is_part_of_identity() {
        let a = RequestKey::new("GET", "https://example.com/index?a=1").unwrap();
        let b = RequestKey::new("GET", "https://example.com/index?a=2").unwrap();
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_invalid_method_rejected() {
        assert!(matches!(RequestKey::new("", "https://example.com/"), Err(Error::InvalidInput(_))));
        assert!(matches!(RequestKey::new("G T", "https://example.com/"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(matches!(RequestKey::new("GET", "./index"), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_display() {
        let key = RequestKey::new("GET", "https://example.com/settings").unwrap();
        assert_eq!(key.to_string(), "GET https://example.com/settings");
    }
}
