//! # Authenticated query cache
//!
//! Read requests are described as data ([`QueryRequest`]) and identified by a
//! structured [`QueryKey`]. The [`QueryCache`] stores the last result per key
//! and serves it stale-while-revalidate; views hold a [`QueryObserver`] that
//! tracks which key they are currently showing.
//!
//! There is no invalidate call. To force a refetch, change a component of the
//! key (for example a revision counter bumped after a mutation).

pub mod cache;
pub mod key;
pub mod observer;

pub use cache::{CacheConfig, QueryCache, QueryError, QueryFetcher, QueryState};
pub use key::{QueryKey, QueryRequest, Revision};
pub use observer::QueryObserver;
