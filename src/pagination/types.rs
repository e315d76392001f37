//! Pagination types
//!
//! Defines the retrieval cursor and the next-page decision it produces.

use crate::error::{Error, Result};
use crate::types::SearchPage;

/// Results per page returned by the search endpoint
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Highest page counter the endpoint accepts before offsets are rejected
pub const DEFAULT_OFFSET_CEILING: u32 = 401;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Request the next page at this offset
    Offset {
        /// Offset to send
        offset: u32,
    },
    /// Move the lower bound forward, then request from offset 0
    Advance {
        /// New `min_id` value
        min_id: String,
        /// Offset to send (always 0 after an advance)
        offset: u32,
    },
    /// No more pages
    Done,
}

/// Tracks the offset counter and cursor advances during retrieval
///
/// The page counter starts at 1 for the first (offset-less) request. Offsets
/// are derived as `(page - 1) * page_size`, and the counter never goes past
/// `ceiling` before being reset.
#[derive(Debug, Clone)]
pub struct RetrievalCursor {
    page: u32,
    page_size: u32,
    ceiling: u32,
    advances: u32,
}

impl Default for RetrievalCursor {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_OFFSET_CEILING)
    }
}

impl RetrievalCursor {
    /// Create a cursor positioned on the first page
    pub fn new(page_size: u32, ceiling: u32) -> Self {
        Self {
            page: 1,
            page_size,
            ceiling: ceiling.max(1),
            advances: 0,
        }
    }

    /// Current page counter
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Offset of the current page
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1) * self.page_size
    }

    /// Page counter ceiling
    pub fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Number of lower-bound advances so far
    pub fn advances(&self) -> u32 {
        self.advances
    }

    /// Whether the next step must advance the lower bound
    pub fn at_ceiling(&self) -> bool {
        self.page >= self.ceiling
    }

    /// Decide what to request after `page` has been persisted
    ///
    /// An empty page ends retrieval. At the ceiling the counter resets and
    /// the lower bound moves to the last message id on `page`.
    pub fn next(&mut self, page: &SearchPage) -> Result<NextPage> {
        if page.is_empty() {
            return Ok(NextPage::Done);
        }

        let mut min_id = None;
        if self.at_ceiling() {
            let last = page.last_message_id()?.ok_or(Error::MissingMessageId {
                index: page.len().saturating_sub(1),
            })?;
            min_id = Some(last);
            self.page = 0;
            self.advances += 1;
        }

        self.page += 1;
        let offset = self.offset();

        Ok(match min_id {
            Some(min_id) => NextPage::Advance { min_id, offset },
            None => NextPage::Offset { offset },
        })
    }
}
