//! Version registry: the name of the one store that is current.

/// Current cache version. Every store whose name differs is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheVersion(String);

impl CacheVersion {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_current(&self, name: &str) -> bool {
        self.0 == name
    }

    /// Names from `names` that are not the current version, in input order.
    pub fn stale<'a>(&self, names: &'a [String]) -> Vec<&'a str> {
        names
            .iter()
            .map(String::as_str)
            .filter(|name| !self.is_current(name))
            .collect()
    }
}

impl std::fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
