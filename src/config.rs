//! Configuration for search jobs
//!
//! A search job can be described in a YAML (or JSON) file so long searches
//! can be re-run without repeating flags. Command-line values override the
//! file. The credential always comes from the environment.

use crate::error::{Error, Result};
use crate::query::{Bound, QueryBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the credential
pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

/// Environment variable overriding the API base URL
pub const API_BASE_ENV: &str = "DISCORD_API_BASE";

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://discord.com/api/v9";

/// Default archive file when none is given
pub const DEFAULT_OUTPUT: &str = "messages.jsonl";

// ============================================================================
// Search Job
// ============================================================================

/// A search job loaded from a file and/or the command line
///
/// Bounds are kept as strings here and parsed when the query is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchJob {
    /// Guild to search
    #[serde(default)]
    pub guild_id: Option<String>,

    /// Content filter
    #[serde(default)]
    pub content: Option<String>,

    /// Channel filter
    #[serde(default)]
    pub channel_id: Option<String>,

    /// Lower bound (snowflake, RFC 3339, or YYYY-MM-DD)
    #[serde(default)]
    pub after: Option<String>,

    /// Upper bound (snowflake, RFC 3339, or YYYY-MM-DD)
    #[serde(default)]
    pub before: Option<String>,

    /// Archive file
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// API base URL
    #[serde(default)]
    pub api_base: Option<String>,

    /// Failure budget
    #[serde(default)]
    pub max_errors: Option<u32>,

    /// Seconds to wait after a failure
    #[serde(default)]
    pub error_delay_secs: Option<f64>,

    /// Cap on rate-limit retries per page
    #[serde(default)]
    pub max_rate_limit_retries: Option<u32>,

    /// Drop the boundary message repeated after a cursor advance
    #[serde(default)]
    pub dedupe_boundary: Option<bool>,
}

impl SearchJob {
    /// Load a job file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read job file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_str(&content)
    }

    /// Parse a job from YAML or JSON text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Overlay `other` on top of this job; set fields in `other` win
    #[must_use]
    pub fn merge(self, other: SearchJob) -> SearchJob {
        SearchJob {
            guild_id: other.guild_id.or(self.guild_id),
            content: other.content.or(self.content),
            channel_id: other.channel_id.or(self.channel_id),
            after: other.after.or(self.after),
            before: other.before.or(self.before),
            output: other.output.or(self.output),
            api_base: other.api_base.or(self.api_base),
            max_errors: other.max_errors.or(self.max_errors),
            error_delay_secs: other.error_delay_secs.or(self.error_delay_secs),
            max_rate_limit_retries: other.max_rate_limit_retries.or(self.max_rate_limit_retries),
            dedupe_boundary: other.dedupe_boundary.or(self.dedupe_boundary),
        }
    }

    /// Parsed lower bound
    pub fn after_bound(&self) -> Result<Option<Bound>> {
        parse_bound("after", self.after.as_deref())
    }

    /// Parsed upper bound
    pub fn before_bound(&self) -> Result<Option<Bound>> {
        parse_bound("before", self.before.as_deref())
    }

    /// Query builder populated from this job
    pub fn query_builder(&self) -> Result<QueryBuilder> {
        let guild_id = self
            .guild_id
            .clone()
            .ok_or_else(|| Error::missing_field("guild_id"))?;

        Ok(QueryBuilder::new()
            .guild(guild_id)
            .maybe_content(self.content.clone())
            .maybe_channel(self.channel_id.clone())
            .maybe_after(self.after_bound()?)
            .maybe_before(self.before_bound()?))
    }

    /// Archive path, falling back to the default
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    /// API base, falling back to the environment and then the default
    pub fn resolve_api_base(&self) -> String {
        self.api_base
            .clone()
            .or_else(|| std::env::var(API_BASE_ENV).ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
    }
}

fn parse_bound(field: &str, value: Option<&str>) -> Result<Option<Bound>> {
    match value {
        None => Ok(None),
        Some(s) => s
            .parse::<Bound>()
            .map(Some)
            .map_err(|e| Error::invalid_value(field, e.to_string())),
    }
}

// ============================================================================
// Credential
// ============================================================================

/// Validate a credential value
pub fn resolve_token(value: Option<String>) -> Result<String> {
    value
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::missing_field(TOKEN_ENV))
}

/// Read the credential from `DISCORD_TOKEN`
pub fn token_from_env() -> Result<String> {
    resolve_token(std::env::var(TOKEN_ENV).ok())
}
