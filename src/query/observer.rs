use serde::de::DeserializeOwned;

use crate::query::cache::{QueryCache, QueryError, QueryFetcher, QueryState};
use crate::query::key::{QueryKey, QueryRequest};

/// A view's subscription to one key at a time.
///
/// The observer only ever reports the key it currently points at. A response
/// that arrives for a key the observer has moved away from lands in that
/// key's own cache entry and never replaces what the view shows, so the last
/// observed key wins.
#[derive(Debug)]
pub struct QueryObserver<T> {
    key: Option<QueryKey>,
    keep_previous_data: bool,
    last_data: Option<T>,
}

impl<T> Default for QueryObserver<T> {
    fn default() -> Self {
        Self {
            key: None,
            keep_previous_data: false,
            last_data: None,
        }
    }
}

impl<T: DeserializeOwned + Clone> QueryObserver<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// While a new key has no data yet, keep showing the previous key's data
    /// (flagged as a placeholder) instead of a loading state.
    pub fn keep_previous_data(mut self) -> Self {
        self.keep_previous_data = true;
        self
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    /// Points the observer at `key`. Returns whether the key changed.
    pub fn set_key(&mut self, key: QueryKey) -> bool {
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        tracing::debug!("Observer moved to {}", key);
        self.key = Some(key);
        true
    }

    /// Typed state of the current key.
    pub fn state<F: QueryFetcher>(&mut self, cache: &QueryCache<F>) -> QueryState<T> {
        let Some(key) = &self.key else {
            return QueryState::idle();
        };
        let known = cache.contains(key);
        let raw = cache.snapshot(key);

        let mut error = raw.error;
        let data = match raw.data {
            Some(value) => match serde_json::from_value::<T>(value) {
                Ok(data) => Some(data),
                Err(e) => {
                    tracing::error!("Cached payload for {} has an unexpected shape: {}", key, e);
                    error = Some(QueryError {
                        message: format!("Invalid response format: {}", e),
                        status: None,
                    });
                    None
                }
            },
            None => None,
        };

        if let Some(data) = data {
            self.last_data = Some(data.clone());
            return QueryState {
                is_loading: false,
                is_fetching: raw.is_fetching,
                is_placeholder: false,
                data: Some(data),
                error,
            };
        }

        // An entry that does not exist yet is about to be requested.
        let pending = raw.is_fetching || !known;
        if pending {
            if let (true, Some(previous)) = (self.keep_previous_data, &self.last_data) {
                return QueryState {
                    is_loading: false,
                    is_fetching: true,
                    is_placeholder: true,
                    data: Some(previous.clone()),
                    error: None,
                };
            }
            return QueryState {
                is_loading: true,
                is_fetching: true,
                is_placeholder: false,
                data: None,
                error: None,
            };
        }

        QueryState {
            is_loading: false,
            is_fetching: false,
            is_placeholder: false,
            data: None,
            error,
        }
    }

    /// Moves to `key`, makes sure it is fetched and returns the settled state.
    pub async fn fetch<F: QueryFetcher>(
        &mut self,
        cache: &QueryCache<F>,
        key: QueryKey,
        request: &QueryRequest,
    ) -> QueryState<T> {
        self.set_key(key.clone());
        cache.ensure(&key, request).await;
        self.state(cache)
    }
}
