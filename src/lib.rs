//! llmstxt-harvest: a polite single-site content harvester
//!
//! This crate crawls one website breadth-first from a seed URL, turns every HTML
//! page it reaches into a structured record (metadata, sections, links), and can
//! fold per-page findings into a single composite schema record such as a
//! pharmaceutical product profile or a clinical-trial summary.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod schema;
pub mod state;
pub mod url;

use serde::Serialize;
use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Seed URL {url} could not be fetched: {source}")]
    SeedUnreachable { url: String, source: FetchError },
}

/// Per-page fetch failures
///
/// These never abort a crawl on their own; they are recorded in the crawl
/// report. Only a failure on the seed URL is escalated to [`HarvestError`].
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("URL disallowed by robots.txt: {url}")]
    RobotsDisallowed { url: String },

    #[error("Network error for {url}: {message}")]
    Network {
        url: String,
        status: Option<u16>,
        message: String,
    },

    #[error("Unsupported content type for {url}: {content_type}")]
    UnsupportedContentType { url: String, content_type: String },
}

impl FetchError {
    /// Returns the reportable kind of this failure
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RobotsDisallowed { .. } => ErrorKind::RobotsDisallowed,
            Self::Network { .. } => ErrorKind::NetworkError,
            Self::UnsupportedContentType { .. } => ErrorKind::UnsupportedContentType,
        }
    }

    /// Returns the URL the failure refers to
    pub fn url(&self) -> &str {
        match self {
            Self::RobotsDisallowed { url }
            | Self::Network { url, .. }
            | Self::UnsupportedContentType { url, .. } => url,
        }
    }
}

/// Failure categories as they appear in crawl reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ErrorKind {
    RobotsDisallowed,
    NetworkError,
    UnsupportedContentType,
    ParseError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::RobotsDisallowed => "RobotsDisallowed",
            Self::NetworkError => "NetworkError",
            Self::UnsupportedContentType => "UnsupportedContentType",
            Self::ParseError => "ParseError",
        };
        write!(f, "{}", name)
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{crawl, crawl_with_cancellation};
pub use output::{CrawlReport, FailureRecord, PageRecord};
pub use schema::{CompositeSchema, ReferenceDataset, SchemaFragment, SchemaType};
pub use state::PageState;
pub use url::{extract_domain, normalize_seed, normalize_url};
