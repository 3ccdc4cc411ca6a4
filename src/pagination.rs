//! Uniform pagination contract shared by every storage backend.
//!
//! Callers hand in whatever the query string carried; [`PageRequest::normalize`]
//! turns it into a fully-defined request, and [`Page::build`] wraps the
//! fetched slice together with the independently counted total.

use serde::Serialize;

use crate::constants::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Direction of the title ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `sortByTitle=true` (or absent) means ascending.
    pub fn from_sort_by_title(sort_by_title: Option<bool>) -> Self {
        match sort_by_title {
            Some(false) => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    pub fn is_descending(self) -> bool {
        matches!(self, SortDirection::Descending)
    }

    /// Keyword used by SQL-like query languages.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// A fully-defined page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number. Not clamped: zero or negative values are kept
    /// and simply yield a skip of 0.
    pub page_number: i64,
    /// Always within `1..=MAX_PAGE_SIZE`.
    pub page_size: u32,
    pub sort: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::normalize(None, None, None)
    }
}

impl PageRequest {
    /// Fill in defaults and clamp the page size.
    ///
    /// A page size that is absent, zero, negative or above the maximum
    /// silently falls back to the default; it never produces an error.
    pub fn normalize(
        page_number: Option<i64>,
        page_size: Option<i64>,
        sort_by_title: Option<bool>,
    ) -> Self {
        let page_size = match page_size {
            Some(size) if size > 0 && size <= i64::from(MAX_PAGE_SIZE) => size as u32,
            _ => DEFAULT_PAGE_SIZE,
        };

        Self {
            page_number: page_number.unwrap_or(DEFAULT_PAGE_NUMBER),
            page_size,
            sort: SortDirection::from_sort_by_title(sort_by_title),
        }
    }

    /// Number of leading items excluded before the page begins.
    pub fn skip(&self) -> u64 {
        let skip = self
            .page_number
            .saturating_sub(1)
            .saturating_mul(i64::from(self.page_size));
        skip.max(0) as u64
    }

    /// Page size as the signed limit most drivers expect.
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Whether the request sorts ascending, i.e. the `sortByTitle` flag it echoes.
    pub fn sort_by_title(&self) -> bool {
        !self.sort.is_descending()
    }

    /// Total number of pages for `total` items at this page size.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }
}

/// One page of a larger, title-ordered result set.
///
/// `total` comes from a separate count read and is not guaranteed to be
/// consistent with `items` under concurrent writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub displayed: usize,
    pub total: u64,
    pub request: PageRequest,
}

/// Caller-facing result of a paginated query.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome<T> {
    Content(Page<T>),
    /// Zero items on this page. Valid, not an error.
    Empty { total: u64 },
}

impl<T> Page<T> {
    /// Wrap a fetched slice and its separately counted total.
    pub fn build(items: Vec<T>, total: u64, request: PageRequest) -> PageOutcome<T> {
        if items.is_empty() {
            return PageOutcome::Empty { total };
        }

        PageOutcome::Content(Page {
            displayed: items.len(),
            items,
            total,
            request,
        })
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            displayed: self.displayed,
            total: self.total,
            request: self.request,
        }
    }
}

impl<T> PageOutcome<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, PageOutcome::Empty { .. })
    }

    pub fn total(&self) -> u64 {
        match self {
            PageOutcome::Content(page) => page.total,
            PageOutcome::Empty { total } => *total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-5)]
    #[case(-1)]
    #[case(0)]
    #[case(11)]
    #[case(1000)]
    #[case(i64::MAX)]
    #[case(i64::MIN)]
    fn test_out_of_range_page_size_falls_back_to_default(#[case] size: i64) {
        let request = PageRequest::normalize(None, Some(size), None);
        assert_eq!(request.page_size, 10);
    }

    #[rstest]
    #[case(1)]
    #[case(5)]
    #[case(10)]
    fn test_in_range_page_size_is_kept(#[case] size: i64) {
        let request = PageRequest::normalize(None, Some(size), None);
        assert_eq!(i64::from(request.page_size), size);
    }

    #[test]
    fn test_defaults() {
        let request = PageRequest::default();
        assert_eq!(request.page_number, 1);
        assert_eq!(request.page_size, 10);
        assert_eq!(request.sort, SortDirection::Ascending);
        assert_eq!(request.skip(), 0);
    }

    #[test]
    fn test_skip_for_third_page() {
        let request = PageRequest::normalize(Some(3), Some(10), None);
        assert_eq!(request.skip(), 20);
    }

    #[rstest]
    #[case(0)]
    #[case(-4)]
    #[case(i64::MIN)]
    fn test_non_positive_page_number_is_kept_but_skips_nothing(#[case] number: i64) {
        let request = PageRequest::normalize(Some(number), Some(5), None);
        assert_eq!(request.page_number, number);
        assert_eq!(request.skip(), 0);
    }

    #[test]
    fn test_huge_page_number_saturates() {
        let request = PageRequest::normalize(Some(i64::MAX), Some(10), None);
        assert_eq!(request.skip(), i64::MAX as u64);
    }

    #[test]
    fn test_sort_flag() {
        assert_eq!(
            PageRequest::normalize(None, None, Some(true)).sort,
            SortDirection::Ascending
        );
        assert_eq!(
            PageRequest::normalize(None, None, Some(false)).sort,
            SortDirection::Descending
        );
        assert!(!PageRequest::normalize(None, None, Some(false)).sort_by_title());
    }

    #[test]
    fn test_total_pages() {
        let request = PageRequest::normalize(None, Some(5), None);
        assert_eq!(request.total_pages(0), 0);
        assert_eq!(request.total_pages(5), 1);
        assert_eq!(request.total_pages(12), 3);
    }

    #[test]
    fn test_empty_items_build_empty_outcome() {
        let outcome = Page::<u8>::build(Vec::new(), 7, PageRequest::default());
        assert_eq!(outcome, PageOutcome::Empty { total: 7 });
        assert!(outcome.is_empty());
    }

    #[test]
    fn test_build_counts_displayed_items() {
        let outcome = Page::build(vec!["a", "b"], 12, PageRequest::default());
        match outcome {
            PageOutcome::Content(page) => {
                assert_eq!(page.displayed, 2);
                assert_eq!(page.total, 12);
                assert_eq!(page.items, vec!["a", "b"]);
            }
            PageOutcome::Empty { .. } => panic!("expected content"),
        }
    }
}
