use crate::output::{CrawlStatistics, FailureRecord, PageRecord};
use crate::schema::CompositeSchema;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a crawl produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    /// The normalized seed URL
    pub seed_url: String,

    pub started_at: DateTime<Utc>,

    /// Successfully extracted pages, ordered by depth then discovery
    pub pages: Vec<PageRecord>,

    /// Per-page failures in the order they happened
    pub failures: Vec<FailureRecord>,

    /// Composite record; None when no schema was requested or no fragment arrived
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<CompositeSchema>,

    pub stats: CrawlStatistics,

    /// True when the crawl stopped on cancellation or deadline
    pub cancelled: bool,
}

impl CrawlReport {
    /// Pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Finds the page record for a source URL
    pub fn page(&self, source_url: &str) -> Option<&PageRecord> {
        self.pages
            .iter()
            .find(|page| page.metadata.source_url == source_url)
    }
}
