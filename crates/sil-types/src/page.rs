use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Default page size for list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 15;
/// Hard cap on requested page size.
pub const MAX_PER_PAGE: u32 = 100;

/// Sort direction for list endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl std::str::FromStr for SortOrder {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(TypeError::UnknownStatus(other.to_string())),
        }
    }
}

/// A 1-based page request, clamped to sane bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, MAX_PER_PAGE),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Pagination metadata echoed alongside every paginated response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

/// One page of results.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Slice an already filtered and sorted result set down to one page.
    pub fn from_items(items: Vec<T>, request: PageRequest) -> Self {
        let total = items.len() as u64;
        let last_page = (total.div_ceil(request.per_page as u64)).max(1) as u32;
        let page = request.page.min(last_page);
        let start = ((page - 1) * request.per_page) as usize;
        let items: Vec<T> = items
            .into_iter()
            .skip(start)
            .take(request.per_page as usize)
            .collect();
        Self {
            items,
            pagination: Pagination {
                current_page: page,
                last_page,
                per_page: request.per_page,
                total,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps() {
        let req = PageRequest::new(0, 10_000);
        assert_eq!(req.page, 1);
        assert_eq!(req.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn slices_middle_page() {
        let page = Page::from_items((1..=45).collect(), PageRequest::new(2, 15));
        assert_eq!(page.items.first(), Some(&16));
        assert_eq!(page.items.len(), 15);
        assert_eq!(page.pagination.last_page, 3);
        assert_eq!(page.pagination.total, 45);
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        let page = Page::from_items(vec![1, 2, 3], PageRequest::new(9, 2));
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.items, vec![3]);
    }

    #[test]
    fn empty_result_set_has_one_empty_page() {
        let page = Page::<i32>::from_items(vec![], PageRequest::default());
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.last_page, 1);
        assert_eq!(page.pagination.total, 0);
    }

    #[test]
    fn sort_order_parses() {
        assert_eq!("asc".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("up".parse::<SortOrder>().is_err());
    }
}
