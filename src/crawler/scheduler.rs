//! Shared frontier for the worker pool
//!
//! This module handles:
//! - Handing out URLs to workers in frontier order
//! - Parking idle workers until new links arrive or the crawl ends
//! - Enforcing depth, page budget and host bounds through [`CrawlState`]
//!
//! Every decision about what gets fetched is made under one lock, so two
//! workers can never claim the same URL.

use crate::crawler::discovery::DiscoveredLink;
use crate::state::{CrawlState, Dequeue, PageState, QueuedUrl};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

/// Point-in-time view of crawl progress
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerSnapshot {
    pub page_count: usize,
    pub visited_count: usize,
    pub frontier_len: usize,
    pub in_flight: usize,
    pub state_counts: HashMap<PageState, usize>,
}

/// Scheduler owns the crawl state and coordinates workers
pub struct Scheduler {
    state: Mutex<CrawlState>,
    wakeup: Notify,
}

impl Scheduler {
    /// Creates a scheduler with an empty frontier
    ///
    /// # Arguments
    ///
    /// * `max_depth` - Deepest link distance from the seed that may be fetched
    /// * `max_pages` - Number of URLs that may be claimed over the whole crawl
    pub fn new(max_depth: u32, max_pages: usize) -> Self {
        Self {
            state: Mutex::new(CrawlState::new(max_depth, max_pages)),
            wakeup: Notify::new(),
        }
    }

    // A worker that panicked mid-update leaves counters that are still usable
    fn lock(&self) -> MutexGuard<'_, CrawlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restricts future enqueues to the host of `url`
    pub fn restrict_to_host(&self, url: &Url) {
        self.lock().restrict_to_host(url);
    }

    /// Adds one URL to the frontier, waking idle workers if it was accepted
    pub fn enqueue(&self, url: Url, depth: u32, priority: u32) -> bool {
        let accepted = self.lock().enqueue(url, depth, priority);
        if accepted {
            self.wakeup.notify_waiters();
        }
        accepted
    }

    /// Adds links discovered on a page at `depth`; returns how many were new
    pub fn enqueue_links(&self, links: Vec<DiscoveredLink>, depth: u32) -> usize {
        let accepted = {
            let mut state = self.lock();
            links
                .into_iter()
                .filter(|link| state.enqueue(link.url.clone(), depth, link.priority))
                .count()
        };

        if accepted > 0 {
            tracing::debug!("Queued {} new URLs at depth {}", accepted, depth);
            self.wakeup.notify_waiters();
        }
        accepted
    }

    /// Waits for the next URL to fetch
    ///
    /// Returns None once the frontier is drained with nothing in flight, or
    /// the page budget is spent. While other workers are still processing
    /// pages that may add links, the caller is parked rather than polled.
    pub async fn next(&self) -> Option<QueuedUrl> {
        loop {
            // Registered before the check so a wakeup between check and await is not lost
            let notified = self.wakeup.notified();

            let dequeued = self.lock().dequeue();
            match dequeued {
                Dequeue::Ready(queued) => {
                    tracing::debug!("Dequeued {} (depth {})", queued.url, queued.depth);
                    return Some(queued);
                }
                Dequeue::Exhausted => {
                    self.wakeup.notify_waiters();
                    return None;
                }
                Dequeue::Pending => {
                    tracing::trace!("Frontier empty with pages in flight, waiting");
                }
            }

            notified.await;
        }
    }

    /// Records the final URL of a redirected fetch so it is never fetched again
    ///
    /// Returns false when that URL was already fetched, in which case the
    /// caller should drop the page with [`Scheduler::discard_redirect`].
    pub fn mark_visited(&self, url: &Url) -> bool {
        self.lock().mark_visited(url)
    }

    /// Closes a claimed URL that redirected to an already fetched page
    pub fn discard_redirect(&self, url: &Url) {
        self.lock().discard_redirect(url);
        self.wakeup.notify_waiters();
    }

    /// Records the outcome of a claimed URL and wakes idle workers
    pub fn complete(&self, url: &Url, extracted: bool) {
        self.lock().complete(url, extracted);
        self.wakeup.notify_waiters();
    }

    /// Releases a claimed URL without an outcome (cancellation)
    pub fn abandon(&self) {
        self.lock().abandon();
        self.wakeup.notify_waiters();
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        let state = self.lock();
        SchedulerSnapshot {
            page_count: state.page_count(),
            visited_count: state.visited_count(),
            frontier_len: state.frontier_len(),
            in_flight: state.in_flight(),
            state_counts: state.state_counts(),
        }
    }
}
