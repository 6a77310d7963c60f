//! Record types produced by a crawl

use crate::ErrorKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Title used when a page has no usable `<title>`
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Descriptive metadata for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    pub source_url: String,
    pub crawled_at: DateTime<Utc>,
}

/// A heading and the content that follows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentSection {
    pub title: String,
    /// Heading level, 1 through 6
    pub level: u8,
    /// Paragraphs separated by blank lines; list items as `- item` lines
    pub body: String,
}

/// An outbound link kept by the extractor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// The structured content of one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageRecord {
    pub metadata: PageMetadata,
    pub sections: Vec<ContentSection>,
    pub links: Vec<Link>,
    /// Link distance from the seed
    pub depth: u32,
}

/// A URL that could not be turned into a page record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureRecord {
    pub url: String,
    pub error_kind: ErrorKind,
    pub message: String,
    pub depth: u32,
}
