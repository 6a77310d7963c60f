//! Output module for crawl results
//!
//! This module handles:
//! - The record types produced per page and per failure
//! - The crawl report returned to callers
//! - LLMs.txt rendering and crawl statistics

mod llms_text;
mod records;
mod report;
pub mod stats;

pub use llms_text::{render_page, render_report};
pub use records::{ContentSection, FailureRecord, Link, PageMetadata, PageRecord, UNKNOWN_TITLE};
pub use report::CrawlReport;
pub use stats::{format_statistics, CrawlStatistics};
