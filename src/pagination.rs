//! Page / page size / sort inputs of the to-do list and the request they map to.

use std::fmt;
use std::str::FromStr;

use crate::client::types::Pagination;
use crate::query::{QueryKey, QueryRequest};

/// Page sizes offered by the list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    Ten,
    Fifty,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 3] = [PageSize::Ten, PageSize::Fifty, PageSize::Hundred];

    pub fn value(self) -> u32 {
        match self {
            PageSize::Ten => 10,
            PageSize::Fifty => 50,
            PageSize::Hundred => 100,
        }
    }

    pub fn from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|size| size.value() == value)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// Order on `createdAt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Oldest first
    Asc,
    /// Latest first
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" | "OLDEST" => Ok(SortOrder::Asc),
            "DESC" | "LATEST" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

/// Inputs of one list request. Every input is part of the cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    page: u32,
    page_size: PageSize,
    sort: SortOrder,
    revision: u64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::default(),
            sort: SortOrder::default(),
            revision: 0,
        }
    }
}

impl PageQuery {
    pub fn new(page: u32, page_size: PageSize, sort: SortOrder) -> Self {
        Self {
            page: page.max(1),
            page_size,
            sort,
            revision: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.page_size = page_size;
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    /// Advances one page. Refused when the server has reported `page_count`
    /// and this is already the last page.
    pub fn next(&mut self, page_count: Option<u32>) -> bool {
        if let Some(count) = page_count {
            if self.page >= count {
                return false;
            }
        }
        match self.page.checked_add(1) {
            Some(page) => {
                self.page = page;
                true
            }
            None => false,
        }
    }

    /// Goes back one page, never below the first.
    pub fn prev(&mut self) -> bool {
        if self.page <= 1 {
            return false;
        }
        self.page -= 1;
        true
    }

    pub fn key(&self) -> QueryKey {
        QueryKey::new("todos")
            .param("page", self.page)
            .param("pageSize", self.page_size)
            .param("sort", self.sort)
            .param("revision", self.revision)
    }

    pub fn request(&self) -> QueryRequest {
        QueryRequest::new("/todos")
            .param("pagination[pageSize]", self.page_size)
            .param("pagination[page]", self.page)
            .param("sort", format!("createdAt:{}", self.sort))
    }
}

/// Next/prev controls as the list view presents them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    pub page: u32,
    pub page_count: u32,
    pub total: u64,
    /// A request is pending; controls are disabled
    pub busy: bool,
}

impl Paginator {
    pub fn new(page: u32, pagination: &Pagination, busy: bool) -> Self {
        Self {
            page,
            page_count: pagination.page_count,
            total: pagination.total,
            busy,
        }
    }

    pub fn can_prev(&self) -> bool {
        !self.busy && self.page > 1
    }

    pub fn can_next(&self) -> bool {
        !self.busy && self.page < self.page_count
    }
}

impl fmt::Display for Paginator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page {} of {} ({} records){}",
            self.page,
            self.page_count,
            self.total,
            if self.busy { " ..." } else { "" }
        )
    }
}
