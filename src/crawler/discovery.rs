//! Link discovery for traversal
//!
//! Unlike the content extractor, discovery reads the raw document: links in
//! navigation and footers are exactly the ones that lead to the rest of a site.

use crate::state::{PRIORITY_HIGH, PRIORITY_NORMAL};
use crate::url::{same_host, visit_key};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// A same-host link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    pub url: Url,
    /// [`PRIORITY_HIGH`] when the URL contains a priority keyword
    pub priority: u32,
}

/// Finds same-host links worth crawling, priority matches first
///
/// # Arguments
///
/// * `html` - The raw HTML of the page
/// * `current_url` - Final URL of the page; relative links resolve against it
/// * `priority_keywords` - URL substrings (case-insensitive) that move a link
///   ahead of the others
///
/// # Returns
///
/// Unique absolute URLs on the same host, fragments removed. Keyword matches
/// come first; document order is kept within each group.
pub fn discover_links(
    html: &str,
    current_url: &Url,
    priority_keywords: &[String],
) -> Vec<DiscoveredLink> {
    let document = Html::parse_document(html);
    let Ok(anchor_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let keywords: Vec<String> = priority_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let mut seen = HashSet::new();
    let mut priority = Vec::new();
    let mut normal = Vec::new();

    for element in document.select(&anchor_selector) {
        if element.value().attr("download").is_some() {
            continue;
        }

        let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, current_url))
        else {
            continue;
        };

        if !same_host(&url, current_url) || !seen.insert(visit_key(&url)) {
            continue;
        }

        let lowered = url.as_str().to_lowercase();
        if keywords.iter().any(|k| lowered.contains(k.as_str())) {
            priority.push(DiscoveredLink {
                url,
                priority: PRIORITY_HIGH,
            });
        } else {
            normal.push(DiscoveredLink {
                url,
                priority: PRIORITY_NORMAL,
            });
        }
    }

    tracing::trace!(
        "Discovered {} priority and {} other links on {}",
        priority.len(),
        normal.len(),
        current_url
    );

    priority.extend(normal);
    priority
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only hrefs (`#...`)
/// - javascript:, mailto:, tel: and data: schemes
/// - invalid URLs
/// - non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is removed.
pub(crate) fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut url = base_url.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/products/overview").unwrap()
    }

    fn urls(links: &[DiscoveredLink]) -> Vec<&str> {
        links.iter().map(|l| l.url.as_str()).collect()
    }

    #[test]
    fn test_resolve_relative() {
        assert_eq!(
            resolve_link("dosing", &base_url()).unwrap().as_str(),
            "https://example.com/products/dosing"
        );
        assert_eq!(
            resolve_link("/safety", &base_url()).unwrap().as_str(),
            "https://example.com/safety"
        );
        assert_eq!(
            resolve_link("../about", &base_url()).unwrap().as_str(),
            "https://example.com/about"
        );
    }

    #[test]
    fn test_resolve_protocol_relative() {
        assert_eq!(
            resolve_link("//cdn.example.com/x", &base_url()).unwrap().as_str(),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn test_resolve_strips_fragment() {
        assert_eq!(
            resolve_link("/page#section", &base_url()).unwrap().as_str(),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_resolve_rejects_special() {
        assert!(resolve_link("", &base_url()).is_none());
        assert!(resolve_link("   ", &base_url()).is_none());
        assert!(resolve_link("#top", &base_url()).is_none());
        assert!(resolve_link("javascript:void(0)", &base_url()).is_none());
        assert!(resolve_link("JavaScript:alert(1)", &base_url()).is_none());
        assert!(resolve_link("mailto:a@example.com", &base_url()).is_none());
        assert!(resolve_link("tel:+15551234567", &base_url()).is_none());
        assert!(resolve_link("data:text/plain,hi", &base_url()).is_none());
        assert!(resolve_link("ftp://example.com/file", &base_url()).is_none());
    }

    #[test]
    fn test_discover_same_host_only() {
        let html = r#"<html><body>
            <a href="/a">A</a>
            <a href="https://example.com/b">B</a>
            <a href="https://other.com/c">C</a>
            <a href="https://sub.example.com/d">D</a>
        </body></html>"#;

        let links = discover_links(html, &base_url(), &[]);
        assert_eq!(
            urls(&links),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }

    #[test]
    fn test_discover_includes_nav_links() {
        let html = r#"<html><body>
            <nav><a href="/safety">Safety</a></nav>
            <footer><a href="/contact">Contact</a></footer>
        </body></html>"#;

        let links = discover_links(html, &base_url(), &[]);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_discover_dedups() {
        let html = r##"<html><body>
            <a href="/a">A</a>
            <a href="/a#x">A again</a>
            <a href="https://example.com/a/">A slash</a>
        </body></html>"##;

        let links = discover_links(html, &base_url(), &[]);
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_discover_skips_download_links() {
        let html = r#"<a href="/label.pdf" download>Label</a><a href="/ok">OK</a>"#;
        let links = discover_links(html, &base_url(), &[]);
        assert_eq!(urls(&links), vec!["https://example.com/ok"]);
    }

    #[test]
    fn test_priority_keywords_first() {
        let html = r#"<html><body>
            <a href="/about">About</a>
            <a href="/Prescribing-Information">PI</a>
            <a href="/careers">Careers</a>
            <a href="/dosing">Dosing</a>
        </body></html>"#;

        let keywords = vec!["prescribing".to_string(), "dosing".to_string()];
        let links = discover_links(html, &base_url(), &keywords);

        assert_eq!(
            urls(&links),
            vec![
                "https://example.com/Prescribing-Information",
                "https://example.com/dosing",
                "https://example.com/about",
                "https://example.com/careers",
            ]
        );
        assert_eq!(links[0].priority, PRIORITY_HIGH);
        assert_eq!(links[2].priority, PRIORITY_NORMAL);
    }

    #[test]
    fn test_no_links() {
        let links = discover_links("<html><body><p>Nothing</p></body></html>", &base_url(), &[]);
        assert!(links.is_empty());
    }
}
