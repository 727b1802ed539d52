//! Client configuration read from the environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::pagination::PageSize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:1337/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);
pub const DEFAULT_SESSION_FILE: &str = ".todo-desk/session.json";
pub const DEFAULT_GENERATE_COUNT: usize = 100;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, including the `/api` prefix
    pub base_url: String,
    /// Fixed per-request timeout
    pub timeout: Duration,
    pub session_file: PathBuf,
    pub page_size: PageSize,
    /// Number of create requests issued by "generate todos"
    pub generate_count: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            page_size: PageSize::default(),
            generate_count: DEFAULT_GENERATE_COUNT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Reads `TODO_API_BASE_URL`, `TODO_API_TIMEOUT_MS`, `TODO_SESSION_FILE`,
    /// `TODO_PAGE_SIZE` and `TODO_GENERATE_COUNT`. Unset variables take the
    /// defaults; unparsable ones are reported and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = env::var("TODO_API_BASE_URL").unwrap_or(defaults.base_url);

        let timeout = parse_var("TODO_API_TIMEOUT_MS", |raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.timeout);

        let session_file = env::var("TODO_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        let page_size = parse_var("TODO_PAGE_SIZE", |raw| {
            raw.parse::<u32>().ok().and_then(PageSize::from_value)
        })
        .unwrap_or(defaults.page_size);

        let generate_count = parse_var("TODO_GENERATE_COUNT", |raw| raw.parse::<usize>().ok())
            .unwrap_or(defaults.generate_count);

        Self {
            base_url,
            timeout,
            session_file,
            page_size,
            generate_count,
        }
    }
}

fn parse_var<T>(name: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    let raw = env::var(name).ok()?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        tracing::warn!("Ignoring invalid value for {}: {:?}", name, raw);
    }
    parsed
}
