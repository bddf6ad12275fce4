//! Common types used across the backend

use serde::{Deserialize, Serialize};

/// Largest page size a list endpoint will serve
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination and search parameters for list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    /// Case-insensitive substring match on the entity name
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
            search: None,
        }
    }
}

impl ListQuery {
    /// Page number clamped to at least 1
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size clamped to `1..=MAX_PER_PAGE`
    pub fn per_page(&self) -> u32 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * self.limit()
    }

    /// SQL `ILIKE` pattern for the search term, `%` when absent
    pub fn search_pattern(&self) -> String {
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let escaped = term
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{}%", escaped)
            }
            _ => "%".to_string(),
        }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, query: &ListQuery, total_items: i64) -> Self {
        let total_items = u64::try_from(total_items).unwrap_or(0);
        let per_page = query.per_page();
        let total_pages = total_items.div_ceil(u64::from(per_page));
        Self {
            data,
            pagination: PaginationMeta {
                page: query.page(),
                per_page,
                total_items,
                total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            },
        }
    }
}
