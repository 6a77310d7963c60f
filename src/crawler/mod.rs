//! Crawler module for fetching and processing pages
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with robots.txt checks and per-host politeness
//! - Content extraction into page records
//! - Same-host link discovery with keyword priority
//! - The shared frontier and the worker pool that drains it

mod coordinator;
mod discovery;
mod extractor;
mod fetcher;
mod scheduler;

pub use coordinator::Coordinator;
pub use discovery::{discover_links, DiscoveredLink};
pub use extractor::{extract_page, Extraction};
pub use fetcher::{build_http_client, is_html_content_type, FetchOptions, FetchedPage, Fetcher};
pub use scheduler::{Scheduler, SchedulerSnapshot};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::schema::ReferenceDataset;
use crate::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and normalize the seed URL
/// 2. Fetch the seed (failure here fails the crawl)
/// 3. Crawl same-host links breadth-first within the depth and page bounds
/// 4. Fold schema fragments into a composite record when a schema type is set
///
/// # Arguments
///
/// * `seed` - Seed URL; `https://` is assumed when the scheme is omitted
/// * `config` - The crawl configuration
/// * `reference` - Optional product reference data for pharma extraction
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Pages, failures, optional composite schema and statistics
/// * `Err(HarvestError)` - Invalid input or unreachable seed
///
/// # Example
///
/// ```no_run
/// use llmstxt_harvest::{crawl, Config};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = crawl("example.com", Config::default(), None).await?;
/// println!("{} pages", report.pages.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(
    seed: &str,
    config: Config,
    reference: Option<ReferenceDataset>,
) -> Result<CrawlReport> {
    crawl_with_cancellation(seed, config, reference, CancellationToken::new()).await
}

/// Runs a crawl that stops early when `cancel` is triggered
///
/// A cancelled crawl still returns `Ok` with everything gathered so far and
/// `cancelled` set on the report.
pub async fn crawl_with_cancellation(
    seed: &str,
    config: Config,
    reference: Option<ReferenceDataset>,
    cancel: CancellationToken,
) -> Result<CrawlReport> {
    let reference = Arc::new(reference.unwrap_or_default());
    let coordinator = Coordinator::new(config, reference)?;
    coordinator.run(seed, cancel).await
}
