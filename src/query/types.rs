//! Query types
//!
//! `SearchQuery` keeps its parameters in insertion order so the rendered URL
//! is stable, and guarantees at most one `min_id` at any time.

use crate::error::{Error, Result};
use crate::snowflake::datetime_to_snowflake;
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Lower-bound query parameter
pub const MIN_ID_PARAM: &str = "min_id";

/// Upper-bound query parameter
pub const MAX_ID_PARAM: &str = "max_id";

/// Offset query parameter
pub const OFFSET_PARAM: &str = "offset";

// ============================================================================
// Bound
// ============================================================================

/// A search bound, either a raw snowflake or a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Raw snowflake identifier
    Id(u64),
    /// Timestamp, converted to a snowflake when the query is built
    Time(DateTime<Utc>),
}

impl Bound {
    /// Resolve the bound to a snowflake id
    pub fn to_snowflake(&self) -> Result<u64> {
        match self {
            Bound::Id(id) => Ok(*id),
            Bound::Time(dt) => datetime_to_snowflake(dt),
        }
    }
}

impl From<u64> for Bound {
    fn from(id: u64) -> Self {
        Bound::Id(id)
    }
}

impl From<DateTime<Utc>> for Bound {
    fn from(dt: DateTime<Utc>) -> Self {
        Bound::Time(dt)
    }
}

impl FromStr for Bound {
    type Err = Error;

    /// Accepts a snowflake (`1234...`), an RFC 3339 datetime, or a
    /// `YYYY-MM-DD` date taken as UTC midnight.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u64>()
                .map(Bound::Id)
                .map_err(|e| Error::invalid_value("bound", format!("'{s}': {e}")));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Bound::Time(dt.with_timezone(&Utc)));
        }

        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(Bound::Time(midnight.and_utc()));
            }
        }

        Err(Error::invalid_value(
            "bound",
            format!("'{s}' is neither a snowflake, an RFC 3339 datetime, nor YYYY-MM-DD"),
        ))
    }
}

// ============================================================================
// Query Builder
// ============================================================================

/// Builder for a guild message search
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    guild_id: Option<String>,
    content: Option<String>,
    channel_id: Option<String>,
    after: Option<Bound>,
    before: Option<Bound>,
}

impl QueryBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the guild to search
    #[must_use]
    pub fn guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// Filter by message content
    #[must_use]
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Restrict to one channel
    #[must_use]
    pub fn channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Only messages after this bound
    #[must_use]
    pub fn after(mut self, bound: impl Into<Bound>) -> Self {
        self.after = Some(bound.into());
        self
    }

    /// Only messages before this bound
    #[must_use]
    pub fn before(mut self, bound: impl Into<Bound>) -> Self {
        self.before = Some(bound.into());
        self
    }

    /// Optional-setting variants, convenient when forwarding CLI values
    #[must_use]
    pub fn maybe_content(mut self, content: Option<String>) -> Self {
        self.content = content.or(self.content);
        self
    }

    #[must_use]
    pub fn maybe_channel(mut self, channel_id: Option<String>) -> Self {
        self.channel_id = channel_id.or(self.channel_id);
        self
    }

    #[must_use]
    pub fn maybe_after(mut self, bound: Option<Bound>) -> Self {
        self.after = bound.or(self.after);
        self
    }

    #[must_use]
    pub fn maybe_before(mut self, bound: Option<Bound>) -> Self {
        self.before = bound.or(self.before);
        self
    }

    /// Build the query against an API base such as `https://discord.com/api/v9`
    pub fn build(self, api_base: &str) -> Result<SearchQuery> {
        let guild_id = self
            .guild_id
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .ok_or_else(|| Error::missing_field("guild_id"))?;

        if !guild_id.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_value(
                "guild_id",
                format!("'{guild_id}' is not a snowflake"),
            ));
        }

        let base = Url::parse(&format!(
            "{}/guilds/{guild_id}/messages/search",
            api_base.trim_end_matches('/')
        ))?;

        let mut params = Vec::new();
        // An empty content filter is still sent; an empty channel is not an id
        if let Some(content) = self.content {
            params.push(("content".to_string(), content));
        }
        if let Some(channel_id) = self.channel_id.filter(|c| !c.is_empty()) {
            params.push(("channel_id".to_string(), channel_id));
        }
        params.push(("include_nsfw".to_string(), "true".to_string()));
        params.push(("sort_by".to_string(), "timestamp".to_string()));
        params.push(("sort_order".to_string(), "asc".to_string()));

        if let Some(after) = self.after {
            params.push((MIN_ID_PARAM.to_string(), after.to_snowflake()?.to_string()));
        }
        if let Some(before) = self.before {
            params.push((MAX_ID_PARAM.to_string(), before.to_snowflake()?.to_string()));
        }

        Ok(SearchQuery {
            guild_id,
            base,
            params,
        })
    }
}

// ============================================================================
// Search Query
// ============================================================================

/// A built search query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    guild_id: String,
    base: Url,
    params: Vec<(String, String)>,
}

impl SearchQuery {
    /// Start building a query for a guild
    pub fn builder(guild_id: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new().guild(guild_id)
    }

    /// Guild being searched
    pub fn guild_id(&self) -> &str {
        &self.guild_id
    }

    /// Parameters in the order they are sent
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Current lower bound
    pub fn min_id(&self) -> Option<&str> {
        self.param(MIN_ID_PARAM)
    }

    /// Current upper bound
    pub fn max_id(&self) -> Option<&str> {
        self.param(MAX_ID_PARAM)
    }

    fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Replace the lower bound, or append one if none is set
    pub fn set_min_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        match self.params.iter_mut().find(|(k, _)| k == MIN_ID_PARAM) {
            Some((_, value)) => *value = id,
            None => self.params.push((MIN_ID_PARAM.to_string(), id)),
        }
    }

    /// URL without an offset (first request)
    pub fn url(&self) -> Url {
        self.render(None)
    }

    /// URL for a page at the given offset
    pub fn url_with_offset(&self, offset: u32) -> Url {
        self.render(Some(offset))
    }

    fn render(&self, offset: Option<u32>) -> Url {
        let mut url = self.base.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.params {
                pairs.append_pair(key, value);
            }
            if let Some(offset) = offset {
                pairs.append_pair(OFFSET_PARAM, &offset.to_string());
            }
        }
        url
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}
