//! Query parameters and pagination validation

use crate::config::PaginationConfig;
use crate::core::error::ValidationError;
use serde::Deserialize;

/// Raw pagination and sort parameters as they arrive in a query string
///
/// Values are kept as strings so that validation, not extraction, decides what
/// a malformed value means.
///
/// # Example
/// ```rust,ignore
/// // GET /api/starship?page=2&size=5
/// pub async fn list(Query(raw): Query<PageQuery>) -> Response {
///     let pagination = raw.pagination(&PaginationConfig::default())?;
///     // pagination == Pagination { page: 2, size: 5 }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
}

/// Validated pagination request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (starts at 1, no upper bound)
    pub page: u64,

    /// Number of items per page
    pub size: u64,
}

/// Validated search parameters (criteria travel separately, in the body)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub pagination: Pagination,
    pub sort: String,
}

impl PageQuery {
    /// Validate `page` and `size`
    ///
    /// Absent (or empty) values take the configured defaults without being
    /// parsed. Supplied values must be base-10 integers within bounds; they are
    /// never clamped. `page` is checked first.
    pub fn pagination(&self, rules: &PaginationConfig) -> Result<Pagination, ValidationError> {
        let page = match supplied(&self.page) {
            None => rules.default_page,
            Some(raw) => parse_integer(raw)
                .filter(|page| *page >= 1)
                .ok_or_else(|| ValidationError::InvalidPage {
                    value: raw.to_string(),
                })?,
        };

        let size = match supplied(&self.size) {
            None => rules.default_size,
            Some(raw) => parse_integer(raw)
                .filter(|size| (1..=rules.max_size).contains(size))
                .ok_or_else(|| ValidationError::InvalidSize {
                    value: raw.to_string(),
                    max: rules.max_size,
                })?,
        };

        Ok(Pagination { page, size })
    }

    /// Validate pagination and resolve the sort key
    pub fn search(&self, rules: &PaginationConfig) -> Result<SearchParams, ValidationError> {
        let pagination = self.pagination(rules)?;
        let sort = supplied(&self.sort)
            .map(str::to_string)
            .unwrap_or_else(|| rules.default_sort.clone());

        Ok(SearchParams { pagination, sort })
    }
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Parse a base-10 integer; negative numbers parse but never pass the bounds
fn parse_integer(raw: &str) -> Option<u64> {
    let parsed: i128 = raw.trim().parse().ok()?;
    u64::try_from(parsed).ok()
}
