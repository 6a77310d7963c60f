//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Fetching the seed inline and failing the crawl if it is unreachable
//! - A fixed pool of workers pulling from the shared [`Scheduler`]
//! - Per-page extraction, link discovery and schema fragment derivation
//! - A single merger task fed over a channel
//! - Cancellation and the optional crawl deadline

use crate::config::{validate, Config};
use crate::crawler::discovery::discover_links;
use crate::crawler::extractor::extract_page;
use crate::crawler::fetcher::{FetchOptions, FetchedPage, Fetcher};
use crate::crawler::scheduler::Scheduler;
use crate::output::{CrawlReport, CrawlStatistics, FailureRecord, PageRecord};
use crate::schema::{CompositeSchema, ReferenceDataset, SchemaExtractor, SchemaFragment, SchemaMerger};
use crate::state::{QueuedUrl, PRIORITY_HIGH};
use crate::url::{normalize_seed, visit_key};
use crate::{ErrorKind, FetchError, HarvestError, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// What a worker reports back for one claimed URL
#[derive(Debug)]
enum PageOutcome {
    Extracted {
        sequence: u64,
        record: PageRecord,
        links_found: usize,
    },
    Failed(FailureRecord),
}

/// State shared by every worker of one crawl
struct WorkerContext {
    fetcher: Arc<Fetcher>,
    schema: Arc<SchemaExtractor>,
    scheduler: Arc<Scheduler>,
    priority_keywords: Vec<String>,
    max_depth: u32,
    fragments: mpsc::UnboundedSender<SchemaFragment>,
    outcomes: mpsc::UnboundedSender<PageOutcome>,
    cancel: CancellationToken,
}

impl WorkerContext {
    async fn worker_loop(&self, worker_id: usize) {
        tracing::debug!("Worker {} started", worker_id);

        loop {
            let queued = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = self.scheduler.next() => match next {
                    Some(queued) => queued,
                    None => break,
                },
            };

            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Worker {} abandoning {} on cancellation", worker_id, queued.url);
                    self.scheduler.abandon();
                    break;
                }
                result = self.fetcher.fetch(&queued.url) => result,
            };

            match fetched {
                Ok(page) => self.process_page(&queued, page),
                Err(error) => self.record_failure(&queued, error),
            }
        }

        tracing::debug!("Worker {} finished", worker_id);
    }

    /// Extracts a fetched page, queues its links and emits its fragment
    fn process_page(&self, queued: &QueuedUrl, page: FetchedPage) {
        if visit_key(&page.final_url) != visit_key(&queued.url)
            && !self.scheduler.mark_visited(&page.final_url)
        {
            tracing::debug!(
                "{} redirected to already fetched {}, dropping",
                queued.url,
                page.final_url
            );
            self.scheduler.discard_redirect(&queued.url);
            return;
        }

        let extraction = extract_page(&page.body, &page.final_url);
        let mut record = extraction.record;
        record.depth = queued.depth;

        for warning in &extraction.warnings {
            tracing::warn!("Degraded extraction for {}: {}", page.final_url, warning);
            self.send_outcome(PageOutcome::Failed(FailureRecord {
                url: page.final_url.to_string(),
                error_kind: ErrorKind::ParseError,
                message: warning.clone(),
                depth: queued.depth,
            }));
        }

        let mut links_found = 0;
        if queued.depth < self.max_depth {
            let links = discover_links(&page.body, &page.final_url, &self.priority_keywords);
            links_found = links.len();
            self.scheduler.enqueue_links(links, queued.depth + 1);
        }

        if let Some(fragment) =
            self.schema
                .extract_fragment(&record.metadata, &record.sections, &record.links)
        {
            if self.fragments.send(fragment).is_err() {
                tracing::warn!("Schema merger stopped; dropping fragment for {}", page.final_url);
            }
        }

        tracing::debug!(
            "Extracted {} ({} sections, {} links)",
            page.final_url,
            record.sections.len(),
            record.links.len()
        );

        self.send_outcome(PageOutcome::Extracted {
            sequence: queued.sequence,
            record,
            links_found,
        });
        self.scheduler.complete(&queued.url, true);
    }

    fn record_failure(&self, queued: &QueuedUrl, error: FetchError) {
        tracing::warn!("Failed to fetch {}: {}", queued.url, error);
        self.send_outcome(PageOutcome::Failed(FailureRecord {
            url: queued.url.to_string(),
            error_kind: error.kind(),
            message: error.to_string(),
            depth: queued.depth,
        }));
        self.scheduler.complete(&queued.url, false);
    }

    fn send_outcome(&self, outcome: PageOutcome) {
        if self.outcomes.send(outcome).is_err() {
            tracing::warn!("Outcome collector stopped; dropping page outcome");
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    fetcher: Arc<Fetcher>,
    schema: Arc<SchemaExtractor>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration; validated here
    /// * `reference` - Product reference data for pharma schema extraction
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(HarvestError)` - Invalid configuration or HTTP client setup failed
    pub fn new(config: Config, reference: Arc<ReferenceDataset>) -> Result<Self> {
        validate(&config)?;

        let fetcher = Fetcher::new(FetchOptions::from_config(&config))?;
        let schema = SchemaExtractor::new(config.schema.schema_type, reference);

        Ok(Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
            schema: Arc::new(schema),
        })
    }

    /// Runs one crawl from `seed`
    ///
    /// The seed is fetched first; if that fails the crawl fails with
    /// [`HarvestError::SeedUnreachable`]. After that, traversal is restricted
    /// to the host of the seed's final URL and every per-page failure is
    /// recorded in the report instead.
    ///
    /// Cancelling `cancel` (or reaching the configured deadline) stops new
    /// work, aborts in-flight fetches, and returns what was gathered so far
    /// with `cancelled` set.
    pub async fn run(&self, seed: &str, cancel: CancellationToken) -> Result<CrawlReport> {
        let seed_url = normalize_seed(seed)?;
        let crawler_config = &self.config.crawler;
        let started = Instant::now();
        let started_at = Utc::now();

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {}, {} workers, schema {})",
            seed_url,
            crawler_config.max_depth,
            crawler_config.max_pages,
            crawler_config.workers,
            self.schema.schema_type()
        );

        let cancel = cancel.child_token();
        let deadline_task = crawler_config
            .deadline()
            .map(|deadline| spawn_deadline(deadline, cancel.clone()));

        let scheduler = Arc::new(Scheduler::new(
            crawler_config.max_depth,
            crawler_config.max_pages,
        ));
        scheduler.enqueue(seed_url.clone(), 0, PRIORITY_HIGH);

        let (fragment_tx, fragment_rx) = mpsc::unbounded_channel();
        let merger = tokio::spawn(run_merger(fragment_rx));
        let (outcome_tx, mut outcome_rx) = mpsc::unbounded_channel();

        let context = Arc::new(WorkerContext {
            fetcher: Arc::clone(&self.fetcher),
            schema: Arc::clone(&self.schema),
            scheduler: Arc::clone(&scheduler),
            priority_keywords: crawler_config.priority_keywords.clone(),
            max_depth: crawler_config.max_depth,
            fragments: fragment_tx,
            outcomes: outcome_tx,
            cancel: cancel.clone(),
        });

        if let Err(error) = self.run_seed(&context).await {
            if let Some(task) = deadline_task {
                task.abort();
            }
            return Err(error);
        }

        let workers: Vec<JoinHandle<()>> = (0..crawler_config.workers)
            .map(|worker_id| {
                let context = Arc::clone(&context);
                tokio::spawn(async move { context.worker_loop(worker_id).await })
            })
            .collect();
        drop(context);

        for (worker_id, handle) in workers.into_iter().enumerate() {
            if let Err(e) = handle.await {
                tracing::error!("Worker {} terminated abnormally: {}", worker_id, e);
            }
        }

        if let Some(task) = deadline_task {
            task.abort();
        }
        let cancelled = cancel.is_cancelled();

        // Every sender is gone once the workers and the context are dropped
        let mut pages = Vec::new();
        let mut failures = Vec::new();
        let mut links_discovered = 0;
        while let Some(outcome) = outcome_rx.recv().await {
            match outcome {
                PageOutcome::Extracted {
                    sequence,
                    record,
                    links_found,
                } => {
                    links_discovered += links_found;
                    pages.push((sequence, record));
                }
                PageOutcome::Failed(failure) => failures.push(failure),
            }
        }
        pages.sort_by_key(|(sequence, record)| (record.depth, *sequence));
        let pages: Vec<PageRecord> = pages.into_iter().map(|(_, record)| record).collect();

        let schema = match merger.await {
            Ok(schema) => schema,
            Err(e) => {
                tracing::error!("Schema merger terminated abnormally: {}", e);
                None
            }
        };

        let snapshot = scheduler.snapshot();
        let mut failures_by_kind = BTreeMap::new();
        for failure in &failures {
            *failures_by_kind.entry(failure.error_kind).or_insert(0) += 1;
        }

        let mut stats = CrawlStatistics {
            urls_visited: snapshot.visited_count,
            pages_extracted: pages.len(),
            failures_by_kind,
            links_discovered,
            fragments_merged: schema.as_ref().map_or(0, |s| s.fragment_count),
            elapsed_ms: started.elapsed().as_millis() as u64,
            cancelled,
            ..Default::default()
        };
        stats.set_page_states(&snapshot.state_counts);

        tracing::info!(
            "Crawl of {} {}: {} pages extracted, {} failures, {} URLs visited in {:?}",
            seed_url,
            if cancelled { "cancelled" } else { "completed" },
            stats.pages_extracted,
            stats.total_failures(),
            stats.urls_visited,
            started.elapsed()
        );

        Ok(CrawlReport {
            seed_url: seed_url.to_string(),
            started_at,
            pages,
            failures,
            schema,
            stats,
            cancelled,
        })
    }

    /// Fetches and processes the seed before any worker starts
    async fn run_seed(&self, context: &WorkerContext) -> Result<()> {
        let Some(seed) = context.scheduler.next().await else {
            return Ok(());
        };

        let fetched = tokio::select! {
            biased;
            _ = context.cancel.cancelled() => {
                tracing::info!("Crawl cancelled before the seed was fetched");
                context.scheduler.abandon();
                return Ok(());
            }
            result = context.fetcher.fetch(&seed.url) => result,
        };

        match fetched {
            Ok(page) => {
                tracing::info!("Seed fetched: {} (final URL {})", seed.url, page.final_url);
                context.scheduler.restrict_to_host(&page.final_url);
                context.process_page(&seed, page);
                Ok(())
            }
            Err(source) => {
                tracing::warn!("Seed {} unreachable: {}", seed.url, source);
                context.scheduler.complete(&seed.url, false);
                Err(HarvestError::SeedUnreachable {
                    url: seed.url.to_string(),
                    source,
                })
            }
        }
    }
}

fn spawn_deadline(deadline: std::time::Duration, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(deadline) => {
                tracing::warn!("Crawl deadline of {:?} reached, cancelling", deadline);
                cancel.cancel();
            }
            _ = cancel.cancelled() => {}
        }
    })
}

/// Folds fragments as they arrive; ends when every sender is dropped
async fn run_merger(mut fragments: mpsc::UnboundedReceiver<SchemaFragment>) -> Option<CompositeSchema> {
    let mut merger = SchemaMerger::new();
    while let Some(fragment) = fragments.recv().await {
        merger.fold(fragment);
    }
    tracing::debug!("Merged {} schema fragments", merger.fragment_count());
    merger.finish()
}
