use std::fmt;

use tokio::task::JoinHandle;

use crate::client::TodoPage;
use crate::pagination::{PageQuery, PageSize, Paginator, SortOrder};
use crate::query::{
    QueryCache, QueryFetcher, QueryKey, QueryObserver, QueryRequest, QueryState, Revision,
};

pub const SKELETON_ROWS: usize = 5;
pub const EMPTY_MESSAGE: &str = "No todos found";

/// What the paginated list shows.
#[derive(Debug, Clone, PartialEq)]
pub enum TodosView {
    Loading { skeleton_rows: usize },
    Error { message: String },
    List { titles: Vec<String>, paginator: Paginator },
}

impl fmt::Display for TodosView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TodosView::Loading { skeleton_rows } => {
                for _ in 0..*skeleton_rows {
                    writeln!(f, "  ░░░░░░░░░░░░░░░░░░░░")?;
                }
                Ok(())
            }
            TodosView::Error { message } => writeln!(f, "Error: {}", message),
            TodosView::List { titles, paginator } => {
                if titles.is_empty() {
                    writeln!(f, "{}", EMPTY_MESSAGE)?;
                }
                for title in titles {
                    writeln!(f, "  {}", title)?;
                }
                writeln!(f, "{}", paginator)
            }
        }
    }
}

/// The paginated list of every to-do the API returns.
///
/// Page, page size, sort and the shared revision all feed the cache key, so
/// changing any of them addresses a new entry. The observer keeps the
/// previous page on screen while the next one loads.
pub struct TodosPage<F> {
    cache: QueryCache<F>,
    revision: Revision,
    query: PageQuery,
    observer: QueryObserver<TodoPage>,
    page_count: Option<u32>,
}

impl<F: QueryFetcher + 'static> TodosPage<F> {
    pub fn new(cache: QueryCache<F>, revision: Revision) -> Self {
        Self {
            cache,
            revision,
            query: PageQuery::default(),
            observer: QueryObserver::new().keep_previous_data(),
            page_count: None,
        }
    }

    pub fn with_query(mut self, query: PageQuery) -> Self {
        self.query = query;
        self
    }

    pub fn query(&self) -> &PageQuery {
        &self.query
    }

    fn current(&mut self) -> (QueryKey, QueryRequest) {
        self.query.set_revision(self.revision.current());
        (self.query.key(), self.query.request())
    }

    /// Fetches the current key if needed and returns the settled state.
    pub async fn load(&mut self) -> QueryState<TodoPage> {
        let (key, request) = self.current();
        self.observer.set_key(key.clone());
        self.cache.ensure(&key, &request).await;
        self.state()
    }

    /// Starts fetching the current key in the background so the view can be
    /// rendered while the request is in flight.
    pub fn start_loading(&mut self) -> JoinHandle<()> {
        let (key, request) = self.current();
        self.observer.set_key(key.clone());
        let cache = self.cache.clone();
        tokio::spawn(async move {
            cache.ensure(&key, &request).await;
        })
    }

    pub fn state(&mut self) -> QueryState<TodoPage> {
        let state = self.observer.state(&self.cache);
        if let (Some(page), false) = (&state.data, state.is_placeholder) {
            self.page_count = Some(page.meta.pagination.page_count);
        }
        state
    }

    pub fn next(&mut self) -> bool {
        self.query.next(self.page_count)
    }

    pub fn prev(&mut self) -> bool {
        self.query.prev()
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        if self.query.page_size() != page_size {
            self.query.set_page_size(page_size);
            self.page_count = None;
        }
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.query.set_sort(sort);
    }

    pub fn view(&mut self) -> TodosView {
        let state = self.state();
        if state.is_loading {
            return TodosView::Loading {
                skeleton_rows: SKELETON_ROWS,
            };
        }
        if let Some(error) = state.error {
            return TodosView::Error {
                message: error.message,
            };
        }
        match state.data {
            Some(page) => TodosView::List {
                titles: page.data.iter().map(|todo| todo.title.clone()).collect(),
                paginator: Paginator::new(
                    self.query.page(),
                    &page.meta.pagination,
                    state.is_fetching,
                ),
            },
            None => TodosView::Loading {
                skeleton_rows: SKELETON_ROWS,
            },
        }
    }
}
