//! Request handlers, one module per resource. Every handler answers with the
//! `ApiResponse` envelope.

pub mod admin;
pub mod agents;
pub mod auth;
pub mod categories;
pub mod contacts;
pub mod health;
pub mod projects;
pub mod properties;
pub mod services;
pub mod stories;

use axum::{http::StatusCode, Json};
use std::str::FromStr;

use guri_types::{ApiResponse, Page};

use crate::error::{ApiError, ApiResult};

pub type Envelope<T> = Json<ApiResponse<T>>;

/// Raw query string pairs; typed filters are decoded from these so malformed
/// values come back as enveloped 400s
pub type QueryPairs = Vec<(String, String)>;

pub(crate) fn ok<T>(data: T) -> Envelope<T> {
    Json(ApiResponse::ok(data))
}

pub(crate) fn created<T>(data: T) -> (StatusCode, Envelope<T>) {
    (StatusCode::CREATED, Json(ApiResponse::ok(data)))
}

pub(crate) fn done(message: impl Into<String>) -> Envelope<()> {
    Json(ApiResponse::done(message))
}

/// Borrowed `(key, value)` view for the filters' `from_query_pairs`
pub(crate) fn pairs_of(query: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    query.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

pub(crate) fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid id", raw)))
}

/// Last value of `key`, parsed; `None` when absent or blank
pub(crate) fn param<T: FromStr>(pairs: &[(String, String)], key: &str) -> ApiResult<Option<T>> {
    match pairs
        .iter()
        .rev()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
    {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("invalid value for '{}': {}", key, raw))),
        None => Ok(None),
    }
}

pub(crate) fn page_from(pairs: &[(String, String)]) -> ApiResult<Page> {
    Ok(Page::new(
        param(pairs, "page")?.unwrap_or(1),
        param(pairs, "limit")?.unwrap_or(Page::DEFAULT_LIMIT),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> QueryPairs {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_page_from_pairs() {
        assert_eq!(page_from(&pairs(&[])).unwrap(), Page::default());
        assert_eq!(
            page_from(&pairs(&[("page", "3"), ("limit", "500")])).unwrap(),
            Page::new(3, Page::MAX_LIMIT)
        );
        assert!(page_from(&pairs(&[("page", "two")])).is_err());
    }

    #[test]
    fn test_param_blank_is_absent() {
        let q = pairs(&[("limit", " ")]);
        assert_eq!(param::<u32>(&q, "limit").unwrap(), None);
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(" 12 ").unwrap(), 12);
        assert!(matches!(parse_id("abc"), Err(ApiError::BadRequest(_))));
    }
}
