//! Retrieval engine module
//!
//! Main read loop for a search.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Retriever` - Fetches every page of a search and appends it to the archive
//! - `RetrieverConfig` - Page size, offset ceiling and boundary handling
//! - `RetrievalReport` - Tagged outcome plus counters for every exit path
//!
//! ```text
//! INIT -> FETCHING_FIRST -> PAGING -> DONE | INTERRUPTED | FAILED
//!                             ^  |
//!                             +--+  (CURSOR_ADVANCE resets the offset)
//! ```

mod types;

pub use types::{RetrievalOutcome, RetrievalReport, RetrievalStats, RetrieverConfig};

use crate::error::Result;
use crate::http::SearchClient;
use crate::output::JsonlWriter;
use crate::pagination::{NextPage, RetrievalCursor};
use crate::query::SearchQuery;
use crate::snowflake::parse_snowflake_time;
use crate::types::{message_id, SearchPage};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use url::Url;

/// Retrieves all results of a search into a JSON-Lines archive
pub struct Retriever {
    /// Search client (owns the error budget)
    client: SearchClient,
    /// Archive writer
    writer: JsonlWriter,
    /// Retrieval configuration
    config: RetrieverConfig,
    /// Statistics
    stats: RetrievalStats,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(client: SearchClient, writer: JsonlWriter) -> Self {
        Self {
            client,
            writer,
            config: RetrieverConfig::default(),
            stats: RetrievalStats::default(),
        }
    }

    /// Set retriever configuration
    #[must_use]
    pub fn with_config(mut self, config: RetrieverConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the search client
    pub fn client(&self) -> &SearchClient {
        &self.client
    }

    /// Retrieve every page of `query`
    ///
    /// `shutdown` resolves when the run should stop (e.g. Ctrl-C). A stop
    /// only cancels an in-flight request or backoff; a page that was fetched
    /// is always written before the signal is checked again. The lower bound
    /// of `query` is updated in place as the cursor advances.
    pub async fn retrieve_all<F>(&mut self, query: &mut SearchQuery, shutdown: F) -> RetrievalReport
    where
        F: Future<Output = ()>,
    {
        let start = Instant::now();
        self.stats = RetrievalStats::default();

        tokio::pin!(shutdown);
        let outcome = match self.run(query, shutdown.as_mut()).await {
            Ok(Some(())) => {
                info!("Search complete");
                RetrievalOutcome::Completed
            }
            Ok(None) => {
                warn!("Search interrupted by user");
                RetrievalOutcome::Interrupted
            }
            Err(e) => {
                error!("Error occurred during search: {e}");
                RetrievalOutcome::Failed(e)
            }
        };

        self.stats.http_attempts = self.client.attempts();
        self.stats.errors = self.client.error_count();
        self.stats.rate_limits = self.client.rate_limits();
        #[allow(clippy::cast_possible_truncation)]
        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            "Total requests made: {} ({} messages written)",
            self.stats.requests, self.stats.messages_written
        );

        RetrievalReport {
            outcome,
            stats: self.stats.clone(),
        }
    }

    /// Paging loop; `Ok(None)` means interrupted
    async fn run<F>(&mut self, query: &mut SearchQuery, mut shutdown: Pin<&mut F>) -> Result<Option<()>>
    where
        F: Future<Output = ()>,
    {
        let mut cursor = RetrievalCursor::new(self.config.page_size, self.config.offset_ceiling);

        self.stats.requests = 1;
        let Some(mut page) = self.fetch(query.url(), shutdown.as_mut()).await? else {
            return Ok(None);
        };

        self.stats.total_results = page.total_results;
        self.stats.expected_requests = page.expected_pages(self.config.page_size);
        info!(
            "Total results: {}, iterating {} times",
            self.stats.total_results, self.stats.expected_requests
        );

        let mut boundary: Option<String> = None;

        loop {
            let written = self.persist(&page, boundary.take())?;
            info!(
                "Request {}/{} ({} messages)",
                self.stats.requests, self.stats.expected_requests, written
            );

            let offset = match cursor.next(&page)? {
                NextPage::Done => return Ok(Some(())),
                NextPage::Offset { offset } => offset,
                NextPage::Advance { min_id, offset } => {
                    match parse_snowflake_time(&min_id) {
                        Ok(at) => info!("Offset limit reached, continuing after {min_id} ({at})"),
                        Err(_) => info!("Offset limit reached, continuing after {min_id}"),
                    }
                    query.set_min_id(min_id.as_str());
                    self.stats.cursor_advances += 1;
                    if self.config.dedupe_boundary {
                        boundary = Some(min_id);
                    }
                    offset
                }
            };

            self.stats.requests += 1;
            let Some(next) = self
                .fetch(query.url_with_offset(offset), shutdown.as_mut())
                .await?
            else {
                return Ok(None);
            };
            page = next;
        }
    }

    /// Fetch one page unless `shutdown` fires first
    async fn fetch<F>(&mut self, url: Url, shutdown: Pin<&mut F>) -> Result<Option<SearchPage>>
    where
        F: Future<Output = ()>,
    {
        let result = tokio::select! {
            biased;
            () = shutdown => return Ok(None),
            result = self.client.fetch_page(&url) => result,
        };

        let page = result?;
        self.stats.add_page();
        Ok(Some(page))
    }

    /// Append a page to the archive, returning the number of lines written
    fn persist(&mut self, page: &SearchPage, boundary: Option<String>) -> Result<usize> {
        let written = match boundary {
            Some(id) => {
                let kept: Vec<_> = page
                    .messages
                    .iter()
                    .filter(|entry| message_id(entry).as_deref() != Some(id.as_str()))
                    .cloned()
                    .collect();
                let skipped = page.len() - kept.len();
                if skipped > 0 {
                    debug!("Skipped {skipped} boundary duplicate(s) of {id}");
                    self.stats.duplicates_skipped += skipped as u64;
                }
                self.writer.append(&kept)?
            }
            None => self.writer.append(&page.messages)?,
        };

        self.stats.add_messages(written);
        Ok(written)
    }
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("client", &self.client)
            .field("writer", &self.writer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
