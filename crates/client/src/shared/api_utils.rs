//! API utilities for client-backend communication
//!
//! Helpers for building URLs, path segments and query strings.

use serde::Serialize;

use crate::shared::error::ApiError;

/// Build a full API URL from the configured base and a path
///
/// # Example
/// ```rust
/// use client::shared::api_utils::api_url;
/// assert_eq!(api_url("https://api.zencat.app/", "/community/"), "https://api.zencat.app/community/");
/// ```
pub fn api_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Percent-encode a single path segment (ids come from user input)
pub fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Serialize a filter struct into a query string, without the leading `?`.
///
/// `None` fields are expected to be skipped by the struct's serde attributes.
pub fn build_query<Q: Serialize>(query: &Q) -> Result<String, ApiError> {
    Ok(serde_qs::to_string(query)?)
}
