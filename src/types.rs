//! Common types used throughout the search archiver
//!
//! Wire types for the search endpoint and small helpers for reading
//! message entries without committing to the platform's full schema.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

// ============================================================================
// Search Response
// ============================================================================

/// One page of search results
///
/// Each entry in `messages` is a message group: a JSON array whose first
/// element is the matched message, followed by contextual messages. Entries
/// are kept opaque and persisted exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total number of matches reported by the server
    #[serde(default)]
    pub total_results: u64,
    /// Message groups in server order
    #[serde(default)]
    pub messages: Vec<JsonValue>,
}

impl SearchPage {
    /// Number of message entries on this page
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the page carries no messages (end of results)
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Expected number of requests for the whole result set
    pub fn expected_pages(&self, page_size: u32) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.total_results.div_ceil(u64::from(page_size))
    }

    /// Identifier of the matched message in the last entry
    ///
    /// Returns `Ok(None)` for an empty page.
    pub fn last_message_id(&self) -> Result<Option<String>> {
        let Some(entry) = self.messages.last() else {
            return Ok(None);
        };
        message_id(entry)
            .map(Some)
            .ok_or(Error::MissingMessageId {
                index: self.messages.len() - 1,
            })
    }
}

/// Body of a 429 response
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitBody {
    /// Seconds to wait before retrying (fractional)
    pub retry_after: f64,
}

// ============================================================================
// Message helpers
// ============================================================================

/// Return the matched message of an entry
///
/// Groups (arrays) yield their first element; bare objects yield themselves.
pub fn matched_message(entry: &JsonValue) -> Option<&JsonValue> {
    match entry {
        JsonValue::Array(items) => items.first(),
        JsonValue::Object(_) => Some(entry),
        _ => None,
    }
}

/// Extract the snowflake id of an entry's matched message
///
/// Ids are strings on the wire; numeric ids are accepted too.
pub fn message_id(entry: &JsonValue) -> Option<String> {
    match matched_message(entry)?.get("id")? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
