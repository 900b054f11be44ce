//! Page-based pagination helpers shared by search and listing endpoints.

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// A normalized 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Build a page request, clamping out-of-range values.
    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self::with_limits(page, page_size, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)
    }

    pub fn with_limits(
        page: Option<u32>,
        page_size: Option<u32>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(default_size).clamp(1, max_size.max(1)),
        }
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }

    /// Slice an already ordered, fully loaded list.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset())
            .take(self.limit())
            .collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        let total_pages = if total_count <= 0 {
            0
        } else {
            ((total_count as u64).div_ceil(request.page_size as u64)) as u32
        };

        Self {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(None, None => (1, DEFAULT_PAGE_SIZE) ; "defaults")]
    #[test_case(Some(0), Some(0) => (1, 1) ; "zeroes clamp up")]
    #[test_case(Some(3), Some(1000) => (3, MAX_PAGE_SIZE) ; "size clamps down")]
    fn test_normalize(page: Option<u32>, size: Option<u32>) -> (u32, u32) {
        let request = PageRequest::new(page, size);
        (request.page, request.page_size)
    }

    #[test]
    fn test_apply_and_total_pages() {
        let request = PageRequest::new(Some(2), Some(3));
        assert_eq!(request.apply((1..=8).collect()), vec![4, 5, 6]);

        let result = PagedResult::new(vec![4, 5, 6], 8, request);
        assert_eq!(result.total_pages, 3);
        assert_eq!(PagedResult::<i32>::new(vec![], 0, request).total_pages, 0);
    }
}
