use crate::schema::SchemaType;
use serde::Deserialize;
use std::time::Duration;

/// Browser identities rotated across requests when none are configured
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:125.0) Gecko/20100101 Firefox/125.0",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36 Edg/124.0.0.0",
];

/// Main configuration structure
///
/// Every table is optional; a missing table takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub schema: SchemaConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link depth from the seed (the seed is depth 0)
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of URLs attempted during one crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Number of concurrent fetch workers
    pub workers: usize,

    /// Minimum time between requests to the same host (milliseconds)
    #[serde(rename = "minimum-request-interval")]
    pub minimum_request_interval_ms: u64,

    /// Page request timeout (milliseconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout_ms: u64,

    /// robots.txt request timeout (milliseconds)
    #[serde(rename = "robots-timeout")]
    pub robots_timeout_ms: u64,

    /// Whether robots.txt disallow rules are honored
    #[serde(rename = "respect-robots")]
    pub respect_robots: bool,

    /// Overall crawl deadline (milliseconds)
    #[serde(rename = "deadline")]
    pub deadline_ms: Option<u64>,

    /// URL substrings whose matches are crawled ahead of other links
    #[serde(rename = "priority-keywords")]
    pub priority_keywords: Vec<String>,
}

impl CrawlerConfig {
    pub fn minimum_request_interval(&self) -> Duration {
        Duration::from_millis(self.minimum_request_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_millis(self.robots_timeout_ms)
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 20,
            workers: 4,
            minimum_request_interval_ms: 1000,
            request_timeout_ms: 15_000,
            robots_timeout_ms: 5_000,
            respect_robots: true,
            deadline_ms: None,
            priority_keywords: Vec::new(),
        }
    }
}

/// Request identity configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Pool of User-Agent strings; one is picked at random per request
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
        }
    }
}

fn default_user_agents() -> Vec<String> {
    DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
}

/// Structured-schema configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Which composite record to build while crawling
    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    /// Path to a TOML reference table of known products
    #[serde(rename = "reference-dataset")]
    pub reference_dataset: Option<String>,
}
