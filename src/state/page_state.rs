/// Page state definitions for tracking crawl progress
///
/// Every URL moves `Queued -> Fetching -> Extracted | Failed | Redirected`.
use serde::Serialize;
use std::fmt;

/// Represents the current state of a URL in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PageState {
    /// Waiting in the frontier
    Queued,

    /// Taken by a worker; fetch or extraction in progress
    Fetching,

    /// Fetched and extracted successfully
    Extracted,

    /// Fetch failed (robots, network, content type)
    Failed,

    /// Redirected to a page that was already fetched; nothing recorded
    Redirected,
}

impl PageState {
    /// Returns true if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Extracted | Self::Failed | Self::Redirected)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Fetching, Self::Extracted)
                | (Self::Fetching, Self::Failed)
                | (Self::Fetching, Self::Redirected)
        )
    }

    /// Converts to the lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::Failed => "failed",
            Self::Redirected => "redirected",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
