use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::client::error::ClientError;
use crate::query::key::{QueryKey, QueryRequest};

/// Performs the network side of a query.
#[async_trait]
pub trait QueryFetcher: Send + Sync {
    async fn fetch(&self, request: &QueryRequest) -> Result<Value, ClientError>;
}

#[async_trait]
impl<T: QueryFetcher + ?Sized> QueryFetcher for Arc<T> {
    async fn fetch(&self, request: &QueryRequest) -> Result<Value, ClientError> {
        (**self).fetch(request).await
    }
}

/// Error recorded in a cache entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub message: String,
    pub status: Option<u16>,
}

impl From<&ClientError> for QueryError {
    fn from(err: &ClientError) -> Self {
        Self {
            message: err.to_string(),
            status: err.status(),
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What a view sees for a key at a point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    /// A request is pending and there is nothing to show yet
    pub is_loading: bool,
    /// A request is pending
    pub is_fetching: bool,
    /// `data` belongs to a previously observed key
    pub is_placeholder: bool,
    pub data: Option<T>,
    pub error: Option<QueryError>,
}

impl<T> QueryState<T> {
    pub fn idle() -> Self {
        Self {
            is_loading: false,
            is_fetching: false,
            is_placeholder: false,
            data: None,
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none() && !self.is_placeholder
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a successful result is served without refetching. Zero means
    /// every observation of a key refetches it.
    pub stale_time: Duration,
    /// Entries unused for this long are evicted.
    pub gc_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_time: Duration::from_secs(5 * 60),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    data: Option<Value>,
    error: Option<QueryError>,
    updated_at: Option<Instant>,
    last_used: Instant,
    in_flight: Option<watch::Sender<bool>>,
}

impl CacheEntry {
    fn new(now: Instant) -> Self {
        Self {
            data: None,
            error: None,
            updated_at: None,
            last_used: now,
            in_flight: None,
        }
    }

    fn state(&self) -> QueryState<Value> {
        let fetching = self.in_flight.is_some();
        QueryState {
            is_loading: fetching && self.data.is_none(),
            is_fetching: fetching,
            is_placeholder: false,
            data: self.data.clone(),
            error: self.error.clone(),
        }
    }
}

struct Inner<F> {
    fetcher: F,
    config: CacheConfig,
    entries: Mutex<HashMap<QueryKey, CacheEntry>>,
}

impl<F> Inner<F> {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared query cache. Cloning yields another handle to the same entries.
///
/// At most one request per key is in flight: callers that arrive while a
/// key is being fetched wait for that request and read its result.
pub struct QueryCache<F> {
    inner: Arc<Inner<F>>,
}

impl<F> Clone for QueryCache<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: QueryFetcher> QueryCache<F> {
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, CacheConfig::default())
    }

    pub fn with_config(fetcher: F, config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                config,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    /// Current state of `key` without triggering anything.
    pub fn snapshot(&self, key: &QueryKey) -> QueryState<Value> {
        self.inner
            .entries()
            .get(key)
            .map(CacheEntry::state)
            .unwrap_or_else(QueryState::idle)
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.entries().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serves `key` from the cache while it is fresh, otherwise fetches it.
    pub async fn ensure(&self, key: &QueryKey, request: &QueryRequest) -> QueryState<Value> {
        let now = Instant::now();
        let fresh = {
            let mut entries = self.inner.entries();
            collect_garbage(&mut entries, now, self.inner.config.gc_time, key);
            match entries.get_mut(key) {
                Some(entry) => {
                    entry.last_used = now;
                    entry.in_flight.is_none()
                        && entry.error.is_none()
                        && entry
                            .updated_at
                            .is_some_and(|at| now.duration_since(at) < self.inner.config.stale_time)
                }
                None => false,
            }
        };

        if fresh {
            tracing::debug!("Serving fresh cache entry for {}", key);
            return self.snapshot(key);
        }
        self.fetch(key, request).await
    }

    /// Fetches `key`, joining the request already in flight if there is one.
    pub async fn fetch(&self, key: &QueryKey, request: &QueryRequest) -> QueryState<Value> {
        let waiter = {
            let mut entries = self.inner.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(Instant::now()));
            entry.last_used = Instant::now();
            match &entry.in_flight {
                Some(sender) => Some(sender.subscribe()),
                None => {
                    let (sender, _) = watch::channel(false);
                    entry.in_flight = Some(sender);
                    None
                }
            }
        };

        if let Some(mut receiver) = waiter {
            tracing::debug!("Joining in-flight request for {}", key);
            // A closed channel means the fetching task went away; either way it is over.
            let _ = receiver.wait_for(|done| *done).await;
            return self.snapshot(key);
        }

        let mut guard = InFlight {
            inner: &self.inner,
            key,
            finished: false,
        };

        tracing::debug!("Fetching {} via {}", key, request.path);
        let result = self.inner.fetcher.fetch(request).await;

        let state = {
            let mut entries = self.inner.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::new(Instant::now()));
            match result {
                Ok(value) => {
                    entry.data = Some(value);
                    entry.error = None;
                    entry.updated_at = Some(Instant::now());
                }
                Err(e) => {
                    tracing::warn!("Query {} failed: {}", key, e);
                    entry.error = Some(QueryError::from(&e));
                }
            }
            if let Some(sender) = entry.in_flight.take() {
                sender.send_replace(true);
            }
            entry.state()
        };
        guard.finished = true;
        state
    }
}

/// Releases the in-flight marker if a fetch is dropped before completing.
struct InFlight<'a, F> {
    inner: &'a Inner<F>,
    key: &'a QueryKey,
    finished: bool,
}

impl<F> Drop for InFlight<'_, F> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut entries = self.inner.entries();
        if let Some(entry) = entries.get_mut(self.key) {
            if let Some(sender) = entry.in_flight.take() {
                sender.send_replace(true);
            }
        }
    }
}

fn collect_garbage(
    entries: &mut HashMap<QueryKey, CacheEntry>,
    now: Instant,
    gc_time: Duration,
    keep: &QueryKey,
) {
    entries.retain(|key, entry| {
        key == keep || entry.in_flight.is_some() || now.duration_since(entry.last_used) < gc_time
    });
}
