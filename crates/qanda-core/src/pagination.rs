//! Pagination primitives shared by list operations.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validated 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
}

impl PageRequest {
    /// Creates a page request.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when `page` is zero or `size` is zero or
    /// exceeds `MAX_PAGE_SIZE`.
    pub fn new(page: u32, size: u32) -> CoreResult<Self> {
        if page < 1 {
            return Err(CoreError::validation("page number must be 1 or greater"));
        }
        if size < 1 || size > MAX_PAGE_SIZE {
            return Err(CoreError::validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, size })
    }

    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Row limit for the backing query.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.size
    }

    /// Row offset for the backing query.
    #[must_use]
    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.size
    }
}

/// One page of results plus the unpaged total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
}

impl<T> Page<T> {
    /// Assembles a page from query results.
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: request.page(),
            size: request.size(),
            total,
        }
    }

    /// Maps items while keeping the page frame.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_numbers_are_one_based() {
        assert!(PageRequest::new(0, 10).is_err());
        let request = PageRequest::new(1, 10).unwrap();
        assert_eq!(request.offset(), 0);
        assert_eq!(PageRequest::new(3, 10).unwrap().offset(), 20);
    }

    #[test]
    fn size_is_bounded() {
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE + 1).is_err());
        assert!(PageRequest::new(1, MAX_PAGE_SIZE).is_ok());
    }
}
