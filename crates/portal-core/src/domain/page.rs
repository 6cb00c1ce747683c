//! Pagination and sorting primitives.

use std::str::FromStr;

use serde::Serialize;

use crate::error::DomainError;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else {
            Err(DomainError::validation(format!(
                "Invalid sort direction '{s}', expected asc or desc"
            )))
        }
    }
}

/// A sort key paired with a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> Sort<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Zero-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<F> {
    pub page: u64,
    pub size: u64,
    pub sort: Sort<F>,
}

impl<F> PageRequest<F> {
    pub const MAX_SIZE: u64 = 100;

    /// Build a request, clamping `size` into `1..=MAX_SIZE`.
    ///
    /// The row offset `page * size` must fit a signed 64-bit `OFFSET`.
    pub fn new(page: u64, size: u64, sort: Sort<F>) -> Result<Self, DomainError> {
        let request = Self {
            page,
            size: size.clamp(1, Self::MAX_SIZE),
            sort,
        };
        match request.offset() {
            Some(_) => Ok(request),
            None => Err(DomainError::validation(format!("Page {page} is out of range"))),
        }
    }

    /// Rows to skip, or `None` when the offset does not fit an `i64`.
    pub fn offset(&self) -> Option<u64> {
        row_offset(self.page, self.size)
    }
}

/// `page * size`, if it is representable as a SQL `OFFSET`.
pub fn row_offset(page: u64, size: u64) -> Option<u64> {
    page.checked_mul(size).filter(|offset| *offset <= i64::MAX as u64)
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: u64, size: u64, total_elements: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_elements.div_ceil(size)
        };
        Self {
            content,
            page,
            size,
            total_elements,
            total_pages,
        }
    }

    /// Slice an already ordered, fully materialized result set.
    pub fn from_ordered<F>(all: Vec<T>, request: &PageRequest<F>) -> Self {
        let total = all.len() as u64;
        let content = match request.offset() {
            Some(offset) if offset < total => all
                .into_iter()
                .skip(offset as usize)
                .take(request.size as usize)
                .collect(),
            _ => Vec::new(),
        };
        Self::new(content, request.page, request.size, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 0, 10, 21);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_from_ordered_slices_requested_page() {
        let request = PageRequest::new(1, 2, Sort::asc(())).unwrap();
        let page = Page::from_ordered(vec![1, 2, 3, 4, 5], &request);
        assert_eq!(page.content, vec![3, 4]);
        assert_eq!(page.total_elements, 5);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_size_is_clamped() {
        let request = PageRequest::new(0, 0, Sort::asc(())).unwrap();
        assert_eq!(request.size, 1);
        let request = PageRequest::new(0, 10_000, Sort::asc(())).unwrap();
        assert_eq!(request.size, PageRequest::<()>::MAX_SIZE);
    }

    #[test]
    fn test_page_past_sql_offset_range_is_rejected() {
        let result = PageRequest::new(200_000_000_000_000_000, 100, Sort::asc(()));
        assert!(matches!(result, Err(DomainError::Validation(_))));

        // 64 * 2^58 wraps to zero in u64 arithmetic
        assert!(PageRequest::new(1 << 58, 64, Sort::asc(())).is_err());
        assert!(PageRequest::new((i64::MAX as u64) / 100, 100, Sort::asc(())).is_ok());
    }

    #[test]
    fn test_unrepresentable_offset_yields_empty_slice() {
        let request = PageRequest {
            page: u64::MAX,
            size: 10,
            sort: Sort::asc(()),
        };
        let page = Page::from_ordered(vec![1, 2, 3], &request);
        assert!(page.content.is_empty());
        assert_eq!(page.total_elements, 3);
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
