use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identity of a cached request: a resource name plus ordered parameters.
///
/// Two keys are the same entry exactly when resource and parameters compare
/// equal, so changing any parameter (page, sort, revision, ...) addresses a
/// different entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    resource: String,
    params: Vec<(String, String)>,
}

impl QueryKey {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.resource)?;
        for (name, value) in &self.params {
            write!(f, ":{}={}", name, value)?;
        }
        Ok(())
    }
}

/// A GET request described as data: a path under the API root plus query
/// parameters in the order they are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl QueryRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    /// Absolute URL under `base_url`. Parameter names are sent as written
    /// (bracketed names like `pagination[page]` included); values are
    /// percent-encoded.
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        if !self.params.is_empty() {
            let query: Vec<String> = self
                .params
                .iter()
                .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        url
    }
}

/// Shared counter used as a key component. Bumping it after a mutation gives
/// every key built from it a new identity, which forces a refetch.
#[derive(Debug, Clone, Default)]
pub struct Revision(Arc<AtomicU64>);

impl Revision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }

    /// Advances the counter and returns the new value.
    pub fn bump(&self) -> u64 {
        let next = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!("Revision bumped to {}", next);
        next
    }
}
