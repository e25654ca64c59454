//! URL handling module for Shelf-Harvest
//!
//! Product URLs must be absolute http/https URLs with a host. This module
//! performs that check and extracts request paths for robots.txt lookups.

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates an absolute http/https URL
///
/// # Arguments
///
/// * `input` - The URL string to validate
///
/// # Returns
///
/// * `Ok(Url)` - The parsed URL
/// * `Err(UrlError)` - The URL is malformed, has a non-HTTP scheme, or no host
///
/// # Examples
///
/// ```
/// use shelf_harvest::url::parse_http_url;
///
/// assert!(parse_http_url("https://www.example.co.uk/product/123").is_ok());
/// assert!(parse_http_url("example").is_err());
/// assert!(parse_http_url("ftp://example.com/").is_err());
/// ```
pub fn parse_http_url(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::InvalidScheme(other.to_string())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlError::MissingDomain),
    }
}

/// Returns the path component of a URL, as matched against robots.txt rules
pub fn request_path(url: &Url) -> &str {
    url.path()
}
