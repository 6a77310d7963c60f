use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use llmstxt_harvest::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs name the same host
///
/// Ports and schemes are ignored; `www.example.com` and `example.com` are
/// different hosts.
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Returns the origin key (`scheme://host:port`) used for per-host state
///
/// robots.txt and politeness timers are tracked per origin.
pub fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}
