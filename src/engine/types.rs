//! Engine types
//!
//! Configuration, outcome and statistics for a retrieval run.

use crate::error::Error;
use crate::pagination::{DEFAULT_OFFSET_CEILING, DEFAULT_PAGE_SIZE};

/// Configuration for a retrieval run
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Results per page returned by the endpoint
    pub page_size: u32,
    /// Page counter ceiling before the lower bound must advance
    pub offset_ceiling: u32,
    /// Drop messages equal to the new lower bound on the page after an advance
    pub dedupe_boundary: bool,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            offset_ceiling: DEFAULT_OFFSET_CEILING,
            dedupe_boundary: false,
        }
    }
}

impl RetrieverConfig {
    /// Create a new retriever config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Set the page counter ceiling
    #[must_use]
    pub fn with_offset_ceiling(mut self, ceiling: u32) -> Self {
        self.offset_ceiling = ceiling;
        self
    }

    /// Enable boundary de-duplication
    #[must_use]
    pub fn with_dedupe_boundary(mut self, dedupe: bool) -> Self {
        self.dedupe_boundary = dedupe;
        self
    }
}

/// How a retrieval run ended
#[derive(Debug)]
pub enum RetrievalOutcome {
    /// An empty page was reached
    Completed,
    /// Stopped by an interrupt signal
    Interrupted,
    /// Stopped by an unrecoverable error
    Failed(Error),
}

impl RetrievalOutcome {
    /// Check if the run completed normally
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Check if the run was interrupted
    pub fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }

    /// Failure reason, if any
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Statistics from a retrieval run
#[derive(Debug, Clone, Default)]
pub struct RetrievalStats {
    /// Total matches reported by the first page
    pub total_results: u64,
    /// Requests the result set should need
    pub expected_requests: u64,
    /// Page requests issued by the loop (retries excluded)
    pub requests: u64,
    /// HTTP requests sent, retries included
    pub http_attempts: u64,
    /// Pages fetched successfully
    pub pages_fetched: u64,
    /// Lines appended to the archive
    pub messages_written: u64,
    /// Lower-bound advances
    pub cursor_advances: u64,
    /// Boundary duplicates dropped
    pub duplicates_skipped: u64,
    /// Rate-limit responses received
    pub rate_limits: u64,
    /// Failures counted against the error budget
    pub errors: u32,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RetrievalStats {
    /// Record a fetched page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Record written messages
    pub fn add_messages(&mut self, count: usize) {
        self.messages_written += count as u64;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Outcome plus statistics, returned whatever the exit cause
#[derive(Debug)]
pub struct RetrievalReport {
    /// How the run ended
    pub outcome: RetrievalOutcome,
    /// Counters collected along the way
    pub stats: RetrievalStats,
}

impl RetrievalReport {
    /// Completed or interrupted runs count as success
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, RetrievalOutcome::Failed(_))
    }
}
