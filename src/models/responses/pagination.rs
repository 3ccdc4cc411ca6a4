//! Pagination response models.

use serde::Serialize;
use utoipa::ToSchema;

use crate::pagination::Page;

/// Paginated list response
#[derive(Debug, Serialize, ToSchema)]
pub struct PageResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Items on this page, ordered by title
    pub items: Vec<T>,
    /// Number of items on this page
    pub displayed: usize,
    /// Total number of items in the store when counted
    pub total: u64,
    /// Requested page number
    pub page_number: i64,
    /// Effective page size
    pub page_size: u32,
    /// Whether items are sorted ascending by title
    pub sort_by_title: bool,
    /// Total number of pages
    pub total_pages: u64,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            success: true,
            displayed: page.displayed,
            total: page.total,
            page_number: page.request.page_number,
            page_size: page.request.page_size,
            sort_by_title: page.request.sort_by_title(),
            total_pages: page.request.total_pages(page.total),
            items: page.items,
        }
    }
}
