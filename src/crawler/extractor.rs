//! Content extraction from fetched HTML
//!
//! Extraction runs in four passes over one parsed document:
//!
//! 1. Metadata from the untouched document (`<title>`, named meta tags,
//!    `<time datetime>`)
//! 2. Cleaning: scripts, styles, frames, navigation, footers, asides,
//!    comments, and elements whose class or id names page chrome are detached
//! 3. Main-region isolation and sectioning by headings
//! 4. Outbound links from the cleaned document
//!
//! Extraction never fails. A page with no extractable text still yields its
//! metadata, plus a warning the crawler reports as a parse failure.

use crate::crawler::discovery::resolve_link;
use crate::output::{ContentSection, Link, PageMetadata, PageRecord, UNKNOWN_TITLE};
use chrono::Utc;
use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use url::Url;

/// Elements removed outright during cleaning
const STRIP_TAGS: &[&str] = &[
    "script", "style", "iframe", "nav", "footer", "aside", "noscript", "template",
];

/// class/id tokens that mark page chrome
const NOISE_TOKENS: &[&str] = &[
    "nav", "menu", "ad", "banner", "cookie", "popup", "sidebar", "footer", "header", "social",
    "share",
];

/// Structural elements never removed because of their class or id
const PROTECTED_TAGS: &[&str] = &["html", "head", "body", "main", "article"];

/// A main-region candidate must hold more text than this to be chosen
const MIN_REGION_TEXT: usize = 200;

/// Links with shorter text are dropped
const MIN_LINK_TEXT: usize = 3;

/// Generic navigation labels that carry no content
const NAV_LABELS: &[&str] = &[
    "home",
    "next",
    "previous",
    "prev",
    "back",
    "more",
    "menu",
    "top",
    "back to top",
    "skip to content",
    "skip to main content",
    "read more",
    "learn more",
    "click here",
    "login",
    "log in",
    "sign in",
    "sign up",
];

const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6";

/// Elements that start a new block when rendering section bodies
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "dd", "details", "div", "dl", "dt", "figure", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "li", "main", "ol", "p", "pre", "section",
    "table", "ul",
];

/// Elements that contribute no text to section bodies
const SKIP_TAGS: &[&str] = &[
    "br", "hr", "img", "svg", "picture", "video", "audio", "canvas", "input", "button",
    "select", "textarea",
];

/// Output of [`extract_page`]
#[derive(Debug, Clone)]
pub struct Extraction {
    pub record: PageRecord,
    /// Problems that degraded extraction without stopping it
    pub warnings: Vec<String>,
}

/// Extracts a structured page record from HTML
///
/// # Arguments
///
/// * `html` - The HTML document
/// * `page_url` - Final URL of the page, used as `sourceUrl` and link base
///
/// # Example
///
/// ```
/// use llmstxt_harvest::crawler::extract_page;
/// use url::Url;
///
/// let html = r#"<html><head><title>Dosing</title></head>
///     <body><h2>Dosage</h2><p>Take one tablet daily.</p></body></html>"#;
/// let url = Url::parse("https://example.com/dosing").unwrap();
/// let extraction = extract_page(html, &url);
/// assert_eq!(extraction.record.metadata.title, "Dosing");
/// assert_eq!(extraction.record.sections[0].title, "Dosage");
/// ```
pub fn extract_page(html: &str, page_url: &Url) -> Extraction {
    let mut document = Html::parse_document(html);

    let metadata = extract_metadata(&document, page_url);

    strip_noise(&mut document);

    // Html::select walks every node including detached ones, so everything
    // after cleaning selects from the root element instead.
    let root = document.root_element();
    let body = first_match(root, "body").unwrap_or(root);
    let region = select_main_region(body);
    let sections = extract_sections(region);
    let links = extract_links(root, page_url);

    let mut warnings = Vec::new();
    if sections.is_empty() && collapse_text(body).is_empty() {
        warnings.push("document contained no extractable text".to_string());
    }

    Extraction {
        record: PageRecord {
            metadata,
            sections,
            links,
            depth: 0,
        },
        warnings,
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first_match<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    let found = scope.select(&sel).next();
    found
}

/// Text of an element with whitespace runs collapsed to single spaces
fn collapse_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn collapse_str(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ===== Metadata =====

fn extract_metadata(document: &Html, page_url: &Url) -> PageMetadata {
    let title = selector("title")
        .and_then(|sel| {
            let title = document.select(&sel).next().map(collapse_text);
            title
        })
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let description = meta_content(document, &["description", "og:description"]);
    let author = meta_content(document, &["author", "article:author"]);
    let published_date = meta_content(
        document,
        &[
            "article:published_time",
            "datePublished",
            "publish-date",
            "date",
        ],
    )
    .or_else(|| time_datetime(document));

    PageMetadata {
        title,
        description,
        author,
        published_date,
        source_url: page_url.to_string(),
        crawled_at: Utc::now(),
    }
}

/// First non-empty `content` of a meta tag whose name or property matches a key
///
/// Keys are tried in order; names compare case-insensitively.
fn meta_content(document: &Html, keys: &[&str]) -> Option<String> {
    let sel = selector("meta[content]")?;

    for key in keys {
        for meta in document.select(&sel) {
            let element = meta.value();
            let name = element
                .attr("name")
                .or_else(|| element.attr("property"))
                .or_else(|| element.attr("itemprop"))
                .unwrap_or("");

            if name.eq_ignore_ascii_case(key) {
                let content = collapse_str(element.attr("content").unwrap_or(""));
                if !content.is_empty() {
                    return Some(content);
                }
            }
        }
    }

    None
}

fn time_datetime(document: &Html) -> Option<String> {
    let sel = selector("time[datetime]")?;
    let datetime = document
        .select(&sel)
        .filter_map(|t| t.value().attr("datetime"))
        .map(str::trim)
        .find(|d| !d.is_empty())
        .map(str::to_string);
    datetime
}

// ===== Cleaning =====

fn strip_noise(document: &mut Html) {
    let doomed: Vec<_> = document
        .tree
        .root()
        .descendants()
        .filter(|node| match node.value() {
            Node::Comment(_) => true,
            Node::Element(element) => is_noise(element),
            _ => false,
        })
        .map(|node| node.id())
        .collect();

    for id in doomed {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn is_noise(element: &Element) -> bool {
    let name = element.name();
    if STRIP_TAGS.contains(&name) {
        return true;
    }
    if PROTECTED_TAGS.contains(&name) {
        return false;
    }

    element.attr("class").map_or(false, names_noise)
        || element.attr("id").map_or(false, names_noise)
}

/// Whether a class or id value contains a noise token
///
/// Two-letter tokens must match a whole word of the value so that `ad` does
/// not match `header` or `download`.
fn names_noise(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    NOISE_TOKENS.iter().any(|token| {
        if token.len() < 3 {
            lower
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|word| word == *token)
        } else {
            lower.contains(token)
        }
    })
}

// ===== Main region =====

/// Picks the element holding the page's primary content
///
/// Candidates in order: `<main>`, `<article>`, then any element whose id or
/// class contains "content". The first with enough text wins; otherwise the
/// whole cleaned body is used.
fn select_main_region(body: ElementRef<'_>) -> ElementRef<'_> {
    for css in ["main", "article", "[id*=\"content\"], [class*=\"content\"]"] {
        let Some(sel) = selector(css) else {
            continue;
        };

        let candidate = body
            .select(&sel)
            .find(|c| collapse_text(*c).chars().count() > MIN_REGION_TEXT);
        if let Some(candidate) = candidate {
            return candidate;
        }
    }

    body
}

// ===== Sections =====

/// A child or sibling node reduced to what rendering needs
enum Piece<'a> {
    Element(ElementRef<'a>),
    Text(&'a str),
}

fn child_pieces<'a>(element: ElementRef<'a>) -> Vec<Piece<'a>> {
    element
        .children()
        .filter_map(|node| match ElementRef::wrap(node) {
            Some(el) => Some(Piece::Element(el)),
            None => node.value().as_text().map(|t| Piece::Text(&**t)),
        })
        .collect()
}

fn following_pieces<'a>(element: ElementRef<'a>) -> Vec<Piece<'a>> {
    element
        .next_siblings()
        .filter_map(|node| match ElementRef::wrap(node) {
            Some(el) => Some(Piece::Element(el)),
            None => node.value().as_text().map(|t| Piece::Text(&**t)),
        })
        .collect()
}

fn extract_sections(region: ElementRef<'_>) -> Vec<ContentSection> {
    let Some(heading_sel) = selector(HEADING_SELECTOR) else {
        return Vec::new();
    };

    let headings: Vec<ElementRef<'_>> = region.select(&heading_sel).collect();

    if headings.is_empty() {
        let mut blocks = Vec::new();
        render_until_heading(child_pieces(region), &mut blocks, &heading_sel);
        let mut body = blocks.join("\n\n");
        if body.is_empty() {
            body = collapse_text(region);
        }
        if body.is_empty() {
            return Vec::new();
        }
        return vec![ContentSection {
            title: "Main Content".to_string(),
            level: 2,
            body,
        }];
    }

    headings
        .into_iter()
        .filter_map(|heading| {
            let body = section_body(heading, region, &heading_sel);
            if body.is_empty() {
                return None;
            }

            let title = collapse_text(heading);
            Some(ContentSection {
                title: if title.is_empty() {
                    "Untitled Section".to_string()
                } else {
                    title
                },
                level: heading_level(heading.value().name()).unwrap_or(2),
                body,
            })
        })
        .collect()
}

fn heading_level(name: &str) -> Option<u8> {
    let level = name.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn is_heading(element: ElementRef<'_>) -> bool {
    heading_level(element.value().name()).is_some()
}

/// Everything after `heading` in document order up to the next heading
///
/// Walks the heading's following siblings, then climbs to its parent's
/// following siblings, never leaving `region`.
fn section_body(heading: ElementRef<'_>, region: ElementRef<'_>, heading_sel: &Selector) -> String {
    let mut blocks = Vec::new();
    let mut cursor = heading;

    loop {
        if render_until_heading(following_pieces(cursor), &mut blocks, heading_sel) {
            break;
        }

        match cursor.parent().and_then(ElementRef::wrap) {
            Some(parent) if parent.id() != region.id() => cursor = parent,
            _ => break,
        }
    }

    blocks.join("\n\n")
}

/// Renders pieces in order, stopping at the first heading
///
/// Returns true if a heading was reached.
fn render_until_heading(pieces: Vec<Piece<'_>>, blocks: &mut Vec<String>, heading_sel: &Selector) -> bool {
    for piece in pieces {
        match piece {
            Piece::Text(text) => push_block(blocks, collapse_str(text)),
            Piece::Element(element) => {
                if is_heading(element) {
                    return true;
                }

                if element.select(heading_sel).next().is_some() {
                    if render_until_heading(child_pieces(element), blocks, heading_sel) {
                        return true;
                    }
                } else {
                    render_element(element, blocks);
                }
            }
        }
    }

    false
}

fn render_element(element: ElementRef<'_>, blocks: &mut Vec<String>) {
    let name = element.value().name();

    match name {
        "ul" | "ol" => {
            let items: Vec<String> = element
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "li")
                .map(collapse_text)
                .filter(|text| !text.is_empty())
                .map(|text| format!("- {}", text))
                .collect();

            if !items.is_empty() {
                blocks.push(items.join("\n"));
            }
        }
        "li" => {
            let text = collapse_text(element);
            if !text.is_empty() {
                blocks.push(format!("- {}", text));
            }
        }
        "table" => {
            let Some(row_sel) = selector("tr") else {
                return;
            };
            let rows: Vec<String> = element
                .select(&row_sel)
                .map(|row| {
                    row.children()
                        .filter_map(ElementRef::wrap)
                        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                        .map(collapse_text)
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .filter(|row| !row.trim().is_empty())
                .collect();

            if !rows.is_empty() {
                blocks.push(rows.join("\n"));
            }
        }
        _ if SKIP_TAGS.contains(&name) => {}
        _ if has_block_child(element) => {
            for piece in child_pieces(element) {
                match piece {
                    Piece::Text(text) => push_block(blocks, collapse_str(text)),
                    Piece::Element(child) => render_element(child, blocks),
                }
            }
        }
        _ => push_block(blocks, collapse_text(element)),
    }
}

fn has_block_child(element: ElementRef<'_>) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| BLOCK_TAGS.contains(&child.value().name()))
}

fn push_block(blocks: &mut Vec<String>, text: String) {
    if !text.is_empty() {
        blocks.push(text);
    }
}

// ===== Links =====

fn extract_links(root: ElementRef<'_>, base_url: &Url) -> Vec<Link> {
    let Some(sel) = selector("a[href]") else {
        return Vec::new();
    };

    let mut links = Vec::new();

    for anchor in root.select(&sel) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(href, base_url) else {
            continue;
        };

        let text = collapse_text(anchor);
        if text.chars().count() < MIN_LINK_TEXT || is_nav_label(&text) {
            continue;
        }

        links.push(Link {
            text,
            url: url.to_string(),
        });
    }

    links
}

fn is_nav_label(text: &str) -> bool {
    let label = text.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
    NAV_LABELS.contains(&label.as_str())
}
