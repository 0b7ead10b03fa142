//! Page envelopes and requests.

use crate::keyset::Traversal;
use serde::{Deserialize, Serialize};

/// Default page size applied when a request leaves it at zero.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// An offset-paginated page with its count-derived position flags.
///
/// Created fresh per call; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedResult<T> {
    items: Vec<T>,
    page_number: u32,
    page_size: u32,
    total_count: u64,
}

impl<T> PagedResult<T> {
    #[must_use]
    pub fn new(items: Vec<T>, page_number: u32, page_size: u32, total_count: u64) -> Self {
        Self {
            items,
            page_number,
            page_size,
            total_count,
        }
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Total pages, rounding up. Zero when there are no rows or no page
    /// size.
    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_count.div_ceil(u64::from(self.page_size))
    }

    #[must_use]
    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    #[must_use]
    pub fn has_next_page(&self) -> bool {
        u64::from(self.page_number) < self.total_pages()
    }

    #[must_use]
    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }

    #[must_use]
    pub fn is_last_page(&self) -> bool {
        u64::from(self.page_number) >= self.total_pages()
    }
}

/// An offset pagination request. Page numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page_number: u32,
    pub page_size: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number,
            page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// A cursor-paginated page. Cursor fields are opaque tokens, never raw
/// key values, so callers cannot construct positions themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
    pub previous_cursor: Option<String>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub page_size: u32,
}

/// A cursor pagination request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorPageRequest {
    /// Opaque boundary token from a previous page, if any.
    pub cursor: Option<String>,
    pub page_size: u32,
    pub traversal: Traversal,
}

impl CursorPageRequest {
    /// First-page / forward request.
    #[must_use]
    pub fn forward(page_size: u32) -> Self {
        Self {
            cursor: None,
            page_size,
            traversal: Traversal::Forward,
        }
    }

    /// Backward request from a previous-cursor token.
    #[must_use]
    pub fn backward(cursor: impl Into<String>, page_size: u32) -> Self {
        Self {
            cursor: Some(cursor.into()),
            page_size,
            traversal: Traversal::Backward,
        }
    }

    /// The same request continued from a cursor token.
    #[must_use]
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// Guard rails for pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    /// Largest accepted page size.
    pub max_page_size: u32,
    /// Largest accepted skip count, guarding against pathological
    /// deep-offset scans.
    pub max_offset: u64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            max_page_size: 200,
            max_offset: 100_000,
        }
    }
}
