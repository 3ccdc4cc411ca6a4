//! Query string accepted by every paginated list endpoint.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::fmt::Display;
use std::str::FromStr;
use utoipa::IntoParams;

use crate::pagination::PageRequest;

/// Raw pagination parameters, before defaults and clamping.
///
/// A parameter given with an empty value (`?pageSize=`) counts as absent.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (default: 1)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_number: Option<i64>,
    /// Items per page (default: 10, values outside 1-10 fall back to 10)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<i64>,
    /// Sort ascending by title (default: true)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub sort_by_title: Option<bool>,
}

impl PageQuery {
    pub fn normalize(&self) -> PageRequest {
        PageRequest::normalize(self.page_number, self.page_size, self.sort_by_title)
    }
}

/// Parse a query value, treating an empty or blank value as `None`.
/// Matching is case-insensitive so `True` parses as a bool.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .to_ascii_lowercase()
            .parse()
            .map(Some)
            .map_err(de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::web;

    fn parse(query: &str) -> Result<PageQuery, actix_web::error::QueryPayloadError> {
        web::Query::<PageQuery>::from_query(query).map(web::Query::into_inner)
    }

    #[test]
    fn test_empty_values_are_absent() {
        let query = parse("pageNumber=&pageSize=&sortByTitle=").unwrap();
        assert_eq!(query.page_number, None);
        assert_eq!(query.page_size, None);
        assert_eq!(query.sort_by_title, None);
        assert_eq!(query.normalize(), PageRequest::default());
    }

    #[test]
    fn test_values_are_parsed() {
        let query = parse("pageNumber=3&pageSize=5&sortByTitle=False").unwrap();
        assert_eq!(query.page_number, Some(3));
        assert_eq!(query.page_size, Some(5));
        assert_eq!(query.sort_by_title, Some(false));
    }

    #[test]
    fn test_missing_parameters_are_absent() {
        let query = parse("").unwrap();
        assert_eq!(query.page_number, None);
        assert_eq!(query.normalize(), PageRequest::default());
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse("pageSize=ten").is_err());
    }
}
