use serde::{Deserialize, Serialize};

use crate::{config::PaginationConfig, error::AppError};

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u32,
    pub size: u32,
}

impl PageRequest {
    /// Page numbers start at 1; `page_size` is clamped to `[1, max_page_size]`.
    pub fn resolve(params: &PageParams, config: &PaginationConfig) -> Self {
        let size = params
            .page_size
            .unwrap_or(config.page_size)
            .clamp(1, config.max_page_size.max(1));
        Self {
            number: params.page.unwrap_or(1).max(1),
            size,
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * i64::from(self.size)
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(page: PageRequest, count: i64, results: Vec<T>) -> Result<Self, AppError> {
        if page.number > 1 && page.offset() >= count {
            return Err(AppError::NotFound("Invalid page.".to_string()));
        }

        let has_next = page.offset() + page.limit() < count;
        Ok(Self {
            count,
            next: has_next.then_some(page.number + 1),
            previous: (page.number > 1).then(|| page.number - 1),
            results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PaginationConfig {
        PaginationConfig { page_size: 10, max_page_size: 100 }
    }

    fn params(query: &str) -> PageParams {
        serde_urlencoded::from_str(query).unwrap()
    }

    #[test]
    fn defaults_to_first_page_of_ten() {
        let page = PageRequest::resolve(&params(""), &config());
        assert_eq!(page, PageRequest { number: 1, size: 10 });
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn page_size_override_is_capped() {
        assert_eq!(PageRequest::resolve(&params("page_size=25"), &config()).size, 25);
        assert_eq!(PageRequest::resolve(&params("page_size=500"), &config()).size, 100);
        assert_eq!(PageRequest::resolve(&params("page_size=0"), &config()).size, 1);
    }

    #[test]
    fn offset_follows_page_number() {
        let page = PageRequest::resolve(&params("page=3&page_size=20"), &config());
        assert_eq!(page.offset(), 40);
        assert_eq!(PageRequest::resolve(&params("page=0"), &config()).number, 1);
    }

    #[test]
    fn links_reflect_position() {
        let page = PageRequest { number: 2, size: 10 };
        let paginated = Paginated::new(page, 35, vec![0u8; 10]).unwrap();
        assert_eq!(paginated.previous, Some(1));
        assert_eq!(paginated.next, Some(3));

        let last = Paginated::new(PageRequest { number: 4, size: 10 }, 35, vec![0u8; 5]).unwrap();
        assert_eq!(last.next, None);
    }

    #[test]
    fn page_past_the_end_is_not_found() {
        let result = Paginated::<u8>::new(PageRequest { number: 5, size: 10 }, 35, Vec::new());
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let empty = Paginated::<u8>::new(PageRequest { number: 1, size: 10 }, 0, Vec::new()).unwrap();
        assert_eq!(empty.count, 0);
        assert_eq!(empty.next, None);
    }
}
