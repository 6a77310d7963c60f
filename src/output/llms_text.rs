//! LLMs.txt rendering
//!
//! Pages become markdown documents headed by their title, source URL and crawl
//! date, with one heading per content section.

use crate::output::{CrawlReport, PageRecord};
use chrono::{DateTime, Utc};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Renders one page
///
/// Section headings keep their source level, clamped to 1..=6.
pub fn render_page(page: &PageRecord) -> String {
    let metadata = &page.metadata;
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", metadata.title));
    if let Some(description) = &metadata.description {
        out.push_str(&format!("> {}\n\n", description));
    }

    out.push_str(&format!("URL: {}\n", metadata.source_url));
    out.push_str(&format!("Date Crawled: {}\n", format_date(&metadata.crawled_at)));
    if let Some(author) = &metadata.author {
        out.push_str(&format!("Author: {}\n", author));
    }
    if let Some(published) = &metadata.published_date {
        out.push_str(&format!("Published: {}\n", published));
    }

    for section in &page.sections {
        let level = section.level.clamp(1, 6) as usize;
        out.push_str(&format!(
            "\n{} {}\n\n{}\n",
            "#".repeat(level),
            section.title,
            section.body.trim()
        ));
    }

    out
}

/// Renders a whole crawl
///
/// A header with the seed URL and crawl date, then every page separated by
/// horizontal rules. The composite schema, if any, is appended as JSON.
pub fn render_report(report: &CrawlReport) -> String {
    let mut out = String::new();
    out.push_str("# Website Content for LLMs\n");
    out.push_str(&format!("URL: {}\n", report.seed_url));
    out.push_str(&format!("Date Crawled: {}\n", format_date(&report.started_at)));

    for page in &report.pages {
        out.push_str("\n---\n\n");
        out.push_str(&render_page(page));
    }

    if let Some(schema) = &report.schema {
        match serde_json::to_string_pretty(schema) {
            Ok(json) => {
                out.push_str("\n---\n\n## Structured Data\n\n```json\n");
                out.push_str(&json);
                out.push_str("\n```\n");
            }
            Err(e) => tracing::warn!("Failed to render composite schema: {}", e),
        }
    }

    out
}
