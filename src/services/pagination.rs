use super::validation::ValidationErrors;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// A validated, 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    page_size: u32,
}

impl Pagination {
    /// Apply defaults to absent values and reject anything below 1.
    ///
    /// There is no upper bound on either value.
    pub fn from_query(
        page: Option<i64>,
        page_size: Option<i64>,
        default_page_size: u32,
    ) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let page = Self::positive(page, DEFAULT_PAGE, "page", &mut errors);
        let page_size = Self::positive(page_size, default_page_size.max(1), "pageSize", &mut errors);
        errors.into_result()?;
        Ok(Self { page, page_size })
    }

    fn positive(value: Option<i64>, default: u32, field: &str, errors: &mut ValidationErrors) -> u32 {
        match value {
            None => default,
            Some(v) if v < 1 => {
                errors.add(field, format!("'{}' must be greater than or equal to 1.", field));
                default
            }
            Some(v) => u32::try_from(v).unwrap_or_else(|_| {
                errors.add(field, format!("'{}' must be at most {}.", field, u32::MAX));
                default
            }),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Rows to skip: `page_size * (page - 1)`, so page 1 starts at 0.
    pub fn skip(&self) -> i64 {
        let skip = u64::from(self.page_size) * u64::from(self.page - 1);
        i64::try_from(skip).unwrap_or(i64::MAX)
    }

    pub fn take(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Whole pages needed for `total_records`, counting a partial last page.
    pub fn total_pages(&self, total_records: i64) -> i64 {
        let size = i64::from(self.page_size);
        let remainder = total_records % size;
        total_records / size + if remainder == 0 { 0 } else { 1 }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
