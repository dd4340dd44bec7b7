//! Page requests.

use moments_types::DEFAULT_PAGE_SIZE;

use crate::sort::Sort;

/// A 1-based page position with its sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl PageRequest {
    /// Builds a page request, clamping absent or zero values to page 1 and
    /// the default size. No upper bound is applied to `size`.
    pub fn of(page: Option<u32>, size: Option<u32>, sort: Sort) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(1),
            size: size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Number of records that precede this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.size)
    }
}
