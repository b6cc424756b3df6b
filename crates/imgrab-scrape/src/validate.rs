use url::Url;

/// Check whether a string is an absolute `http`/`https` URL with a host.
///
/// Malformed input is simply invalid; this never fails.
///
/// # Examples
///
/// ```
/// use imgrab_scrape::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/page"));
/// assert!(!is_valid_url("example.com/page"));
/// assert!(!is_valid_url("ftp://example.com/file"));
/// ```
pub fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
