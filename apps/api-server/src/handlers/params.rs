//! Query-string parsing shared by the listing endpoints.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use portal_core::DomainError;
use portal_core::domain::{PageRequest, Sort, SortDirection};
use serde::Deserialize;

/// `page`, `size`, `sortBy` and `sortDir` query parameters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_dir: Option<String>,
}

impl PageParams {
    /// Build a page request. Missing values take the given defaults. An
    /// unknown sort key or direction, or a page past the addressable range,
    /// is an argument error.
    pub fn to_request<F>(&self, default_size: u64, default_sort: Sort<F>) -> Result<PageRequest<F>, DomainError>
    where
        F: FromStr<Err = DomainError>,
    {
        let field = match non_blank(&self.sort_by) {
            Some(key) => key.parse()?,
            None => default_sort.field,
        };
        let direction = match non_blank(&self.sort_dir) {
            Some(dir) => dir.parse::<SortDirection>()?,
            None => default_sort.direction,
        };

        PageRequest::new(
            self.page.unwrap_or(0),
            self.size.unwrap_or(default_size),
            Sort { field, direction },
        )
    }
}

/// Trimmed value, or `None` when absent or blank.
pub fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse `yyyy-MM-ddTHH:mm:ss` (read as UTC) or an RFC 3339 timestamp.
pub fn parse_datetime(field: &str, raw: &str) -> Result<DateTime<Utc>, DomainError> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| {
            DomainError::validation(format!(
                "{field} must be an ISO-8601 date-time such as 2025-01-31T08:00:00"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use portal_core::domain::{LocationSort, PostSort};

    #[test]
    fn test_defaults_apply_when_params_missing() {
        let request = PageParams::default()
            .to_request(10, Sort::desc(PostSort::PublishedAt))
            .unwrap();
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 10);
        assert_eq!(request.sort, Sort::desc(PostSort::PublishedAt));
    }

    #[test]
    fn test_sort_by_without_direction_keeps_default_direction() {
        let params = PageParams {
            sort_by: Some("viewCount".to_string()),
            ..PageParams::default()
        };
        let request = params.to_request(10, Sort::desc(PostSort::PublishedAt)).unwrap();
        assert_eq!(request.sort, Sort::desc(PostSort::ViewCount));
    }

    #[test]
    fn test_unknown_sort_key_is_rejected() {
        let params = PageParams {
            sort_by: Some("rating".to_string()),
            ..PageParams::default()
        };
        let result = params.to_request(20, Sort::asc(LocationSort::Name));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_huge_page_number_is_an_argument_error() {
        let params = PageParams {
            page: Some(200_000_000_000_000_000),
            size: Some(100),
            ..PageParams::default()
        };
        let result = params.to_request(10, Sort::desc(PostSort::PublishedAt));
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_local_datetime_is_read_as_utc() {
        let parsed = parse_datetime("startDate", "2025-03-01T07:30:00").unwrap();
        assert_eq!((parsed.month(), parsed.day(), parsed.hour()), (3, 1, 7));
    }

    #[test]
    fn test_rfc3339_offset_is_normalized() {
        let parsed = parse_datetime("startDate", "2025-03-01T07:30:00+07:00").unwrap();
        assert_eq!(parsed.hour(), 0);
    }

    #[test]
    fn test_garbage_date_is_an_argument_error() {
        assert!(parse_datetime("endDate", "yesterday").is_err());
    }
}
