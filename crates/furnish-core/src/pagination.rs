//! Pagination primitives for list and search operations.

use serde::{Deserialize, Serialize};

use crate::product::Product;

/// Default page size when the caller does not supply one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated, 1-based page request.
///
/// Out-of-range values are clamped rather than rejected: `page` to `>= 1`,
/// `page_size` to `[1, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Clamps the raw values into a valid request.
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        let page = page.max(1);
        let page_size = if page_size < 1 || page_size > MAX_PAGE_SIZE {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        Self { page, page_size }
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Row offset for the repository query: `(page - 1) * page_size`.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// Row limit for the repository query.
    #[must_use]
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of products together with the total count for the same filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

impl ProductPage {
    #[must_use]
    pub fn new(items: Vec<Product>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            page_size: request.page_size(),
        }
    }

    /// Whether a later page would return more rows.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.total > 0 && i64::from(self.page) * i64::from(self.page_size) < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_page_and_size() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req.page(), 1);
        assert_eq!(req.page_size(), DEFAULT_PAGE_SIZE);

        let req = PageRequest::new(3, 500);
        assert_eq!(req.page(), 3);
        assert_eq!(req.page_size(), DEFAULT_PAGE_SIZE);

        let req = PageRequest::new(2, 50);
        assert_eq!(req.offset(), 50);
        assert_eq!(req.limit(), 50);
    }

    #[test]
    fn has_more_over_45_rows() {
        let page1 = ProductPage::new(Vec::new(), 45, PageRequest::new(1, 20));
        assert!(page1.has_more());

        let page3 = ProductPage::new(Vec::new(), 45, PageRequest::new(3, 20));
        assert_eq!(PageRequest::new(3, 20).offset(), 40);
        assert!(!page3.has_more());
    }

    #[test]
    fn has_more_is_false_when_empty() {
        let page = ProductPage::new(Vec::new(), 0, PageRequest::default());
        assert!(!page.has_more());
    }
}
