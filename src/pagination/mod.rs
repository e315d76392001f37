//! Pagination module
//!
//! Offset pagination with a cursor fallback.
//!
//! # Overview
//!
//! The search endpoint only honours offsets up to a fixed ceiling. Pages are
//! walked by offset until the page counter reaches that ceiling; the lower
//! bound (`min_id`) then moves to the last message seen and the offset
//! restarts at zero. `RetrievalCursor` tracks both halves and tells the
//! retrieval loop what to request next.

mod types;

pub use types::{NextPage, RetrievalCursor, DEFAULT_OFFSET_CEILING, DEFAULT_PAGE_SIZE};
