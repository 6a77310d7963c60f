use crate::state::PageState;
use crate::url::{same_host, visit_key};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use url::Url;

/// Priority class for URLs matching a priority keyword
pub const PRIORITY_HIGH: u32 = 0;

/// Priority class for every other URL
pub const PRIORITY_NORMAL: u32 = 1;

/// A URL waiting in the frontier
#[derive(Debug, Clone)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Link distance from the seed (the seed is 0)
    pub depth: u32,

    /// Priority class (lower is fetched first within a depth)
    pub priority: u32,

    /// Discovery order, used as the final tie-breaker
    pub sequence: u64,
}

// BinaryHeap pops the greatest element, so comparisons are reversed:
// shallower, higher priority, earlier discovered URLs compare greater.
impl Ord for QueuedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .depth
            .cmp(&self.depth)
            .then_with(|| other.priority.cmp(&self.priority))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for QueuedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for QueuedUrl {}

/// Result of asking the frontier for work
#[derive(Debug)]
pub enum Dequeue {
    /// A URL was claimed; it is now in the visited set
    Ready(QueuedUrl),

    /// Nothing to hand out yet, but in-flight pages may still add URLs
    Pending,

    /// The crawl is over: frontier drained or page budget spent
    Exhausted,
}

/// Mutable crawl bookkeeping: frontier, visited set, and counters
///
/// All mutation goes through `&mut self`, so callers that share a
/// `CrawlState` behind one lock get an atomic check-and-insert on the
/// visited set.
#[derive(Debug)]
pub struct CrawlState {
    frontier: BinaryHeap<QueuedUrl>,
    visited: HashSet<String>,
    queued: HashSet<String>,
    redirect_targets: HashSet<String>,
    page_states: HashMap<String, PageState>,
    page_count: usize,
    in_flight: usize,
    next_sequence: u64,
    allowed_host: Option<Url>,
    max_depth: u32,
    max_pages: usize,
}

impl CrawlState {
    pub fn new(max_depth: u32, max_pages: usize) -> Self {
        Self {
            frontier: BinaryHeap::new(),
            visited: HashSet::new(),
            queued: HashSet::new(),
            redirect_targets: HashSet::new(),
            page_states: HashMap::new(),
            page_count: 0,
            in_flight: 0,
            next_sequence: 0,
            allowed_host: None,
            max_depth,
            max_pages,
        }
    }

    /// Restricts future enqueues to the host of `url`
    pub fn restrict_to_host(&mut self, url: &Url) {
        self.allowed_host = Some(url.clone());
    }

    /// Adds a URL to the frontier
    ///
    /// Returns false when the URL is too deep, off-host, or already queued or
    /// visited.
    pub fn enqueue(&mut self, url: Url, depth: u32, priority: u32) -> bool {
        if depth > self.max_depth {
            tracing::trace!("Not queueing {} (depth {} > {})", url, depth, self.max_depth);
            return false;
        }

        if let Some(allowed) = &self.allowed_host {
            if !same_host(allowed, &url) {
                tracing::trace!("Not queueing off-host URL {}", url);
                return false;
            }
        }

        let key = visit_key(&url);
        if self.visited.contains(&key)
            || self.redirect_targets.contains(&key)
            || !self.queued.insert(key.clone())
        {
            return false;
        }

        self.page_states.insert(key, PageState::Queued);
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.frontier.push(QueuedUrl {
            url,
            depth,
            priority,
            sequence,
        });
        true
    }

    /// Claims the next URL to fetch
    ///
    /// Each claim consumes one unit of the page budget whether the fetch later
    /// succeeds or fails, so the visited set never exceeds `max_pages`.
    pub fn dequeue(&mut self) -> Dequeue {
        loop {
            if self.visited.len() >= self.max_pages {
                return Dequeue::Exhausted;
            }

            let Some(queued) = self.frontier.pop() else {
                return if self.in_flight == 0 {
                    Dequeue::Exhausted
                } else {
                    Dequeue::Pending
                };
            };

            let key = visit_key(&queued.url);
            self.queued.remove(&key);

            if queued.depth > self.max_depth
                || self.redirect_targets.contains(&key)
                || !self.visited.insert(key.clone())
            {
                continue;
            }

            self.transition(&key, PageState::Fetching);
            self.in_flight += 1;
            return Dequeue::Ready(queued);
        }
    }

    /// Records the final URL a claimed URL redirected to
    ///
    /// The target is never queued or claimed afterwards and does not consume
    /// page budget. If it already sits in the frontier it is dropped there.
    /// Returns false when the target was already fetched, either directly or
    /// through another redirect.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        let key = visit_key(url);
        if self.visited.contains(&key) || !self.redirect_targets.insert(key.clone()) {
            return false;
        }

        if self.queued.remove(&key) {
            self.page_states.remove(&key);
            tracing::trace!("Dropped queued redirect target {}", url);
        }
        true
    }

    /// Records the outcome of a claimed URL
    pub fn complete(&mut self, url: &Url, extracted: bool) {
        let key = visit_key(url);
        let next = if extracted {
            PageState::Extracted
        } else {
            PageState::Failed
        };
        self.transition(&key, next);

        self.in_flight = self.in_flight.saturating_sub(1);
        if extracted {
            self.page_count += 1;
        }
    }

    /// Closes a claimed URL whose redirect target was already fetched
    pub fn discard_redirect(&mut self, url: &Url) {
        self.transition(&visit_key(url), PageState::Redirected);
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Releases a claimed URL whose processing was abandoned by cancellation
    pub fn abandon(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn transition(&mut self, key: &str, next: PageState) {
        let current = self.page_states.get(key).copied();
        match current {
            Some(state) if state.can_transition_to(next) => {
                self.page_states.insert(key.to_string(), next);
            }
            Some(state) => {
                tracing::warn!("Rejected page state transition for {}: {} -> {}", key, state, next);
            }
            None => {
                tracing::warn!("State transition for untracked URL {} -> {}", key, next);
            }
        }
    }

    /// Current state of a URL, if it was ever queued
    pub fn state_of(&self, url: &Url) -> Option<PageState> {
        self.page_states.get(&visit_key(url)).copied()
    }

    /// Number of URLs in each state
    pub fn state_counts(&self) -> HashMap<PageState, usize> {
        let mut counts = HashMap::new();
        for state in self.page_states.values() {
            *counts.entry(*state).or_insert(0) += 1;
        }
        counts
    }

    /// Whether the URL has been claimed by a worker or reached by a redirect
    pub fn is_visited(&self, url: &Url) -> bool {
        let key = visit_key(url);
        self.visited.contains(&key) || self.redirect_targets.contains(&key)
    }

    /// Number of successfully extracted pages
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Number of claimed URLs
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Number of claimed URLs still being processed
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Number of URLs waiting in the frontier
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }
}
