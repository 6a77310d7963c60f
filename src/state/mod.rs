//! State management module
//!
//! Per-URL states, per-origin politeness and robots state, and the frontier
//! bookkeeping shared by the crawl workers.

mod crawl_state;
mod host_state;
mod page_state;

pub use crawl_state::{CrawlState, Dequeue, QueuedUrl, PRIORITY_HIGH, PRIORITY_NORMAL};
pub use host_state::HostState;
pub use page_state::PageState;
