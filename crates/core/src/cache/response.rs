//! Response snapshots held by a cache store.

use bytes::Bytes;

/// An immutable snapshot of a response: status, status text, headers and body.
///
/// Header names are kept lowercase and in arrival order. The body is a
/// reference-counted buffer, so [`StoredResponse::tee`] forks it without
/// copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl StoredResponse {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self { status, status_text: status_text.into(), headers: Vec::new(), body: Bytes::new() }
    }

    /// Append a header. Existing values with the same name are kept.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.push((name.as_ref().to_ascii_lowercase(), value.into()));
        self
    }

    pub fn with_headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        headers
            .into_iter()
            .fold(self, |response, (name, value)| response.with_header(name, value))
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// First value of the named header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the status is in the 200-299 range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Fork the response into two independent copies, one for the caller
    /// and one for the store.
    pub fn tee(self) -> (Self, Self) {
        let copy = Self {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        };
        (self, copy)
    }

    /// Break the snapshot into its parts.
    pub fn into_parts(self) -> (u16, String, Vec<(String, String)>, Bytes) {
        (self.status, self.status_text, self.headers, self.body)
    }
}
