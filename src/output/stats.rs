//! Crawl statistics
//!
//! This module provides the summary numbers of a finished crawl and a plain
//! text rendering of them.

use crate::state::PageState;
use crate::ErrorKind;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStatistics {
    /// URLs claimed for fetching (successes and failures)
    pub urls_visited: usize,

    /// Pages that produced a record
    pub pages_extracted: usize,

    /// Failure records by kind
    pub failures_by_kind: BTreeMap<ErrorKind, usize>,

    /// URLs by final page state, including ones still queued when the crawl stopped
    pub pages_by_state: BTreeMap<String, usize>,

    /// Same-host links found across all pages
    pub links_discovered: usize,

    /// Schema fragments folded into the composite record
    pub fragments_merged: usize,

    pub elapsed_ms: u64,

    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Total failure records
    pub fn total_failures(&self) -> usize {
        self.failures_by_kind.values().sum()
    }

    /// Share of visited URLs that produced a record, in percent
    pub fn success_rate(&self) -> f64 {
        if self.urls_visited == 0 {
            return 0.0;
        }
        (self.pages_extracted as f64 / self.urls_visited as f64) * 100.0
    }

    /// Fills `pages_by_state` from scheduler counts
    pub fn set_page_states(&mut self, counts: &HashMap<PageState, usize>) {
        self.pages_by_state = counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(state, count)| (state.as_str().to_string(), *count))
            .collect();
    }
}

/// Formats statistics as a plain text block
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn format_statistics(stats: &CrawlStatistics) -> String {
    let mut out = String::new();
    out.push_str("=== Crawl Statistics ===\n\n");

    out.push_str("Overview:\n");
    out.push_str(&format!("  URLs visited: {}\n", stats.urls_visited));
    out.push_str(&format!("  Pages extracted: {}\n", stats.pages_extracted));
    out.push_str(&format!("  Links discovered: {}\n", stats.links_discovered));
    if stats.fragments_merged > 0 {
        out.push_str(&format!("  Schema fragments merged: {}\n", stats.fragments_merged));
    }
    out.push_str(&format!(
        "  Elapsed: {:.2}s\n",
        stats.elapsed_ms as f64 / 1000.0
    ));
    if stats.cancelled {
        out.push_str("  Cancelled before completion\n");
    }
    out.push('\n');

    if !stats.pages_by_state.is_empty() {
        out.push_str("Pages by State:\n");
        let mut state_counts: Vec<_> = stats.pages_by_state.iter().collect();
        state_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        for (state, count) in state_counts {
            out.push_str(&format!("  {}: {}\n", state, count));
        }
        out.push('\n');
    }

    if !stats.failures_by_kind.is_empty() {
        out.push_str("Failures:\n");
        for (kind, count) in &stats.failures_by_kind {
            out.push_str(&format!("  {}: {}\n", kind, count));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "Success Rate: {:.1}% ({} / {} URLs extracted)\n",
        stats.success_rate(),
        stats.pages_extracted,
        stats.urls_visited
    ));

    out
}
