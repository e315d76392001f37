//! HTTP client module
//!
//! Provides the search client used by retrieval.
//!
//! # Features
//!
//! - **Rate Limits**: 429 responses wait the server-specified `retry_after`
//!   and retry without spending the error budget
//! - **Error Budget**: other failures retry after a fixed delay until the
//!   session budget is exhausted
//! - **Authentication**: the credential is sent verbatim in `authorization`

mod client;

pub use client::{
    HttpClientConfig, HttpClientConfigBuilder, SearchClient, DEFAULT_ERROR_DELAY,
    DEFAULT_MAX_ERRORS, DEFAULT_RETRY_AFTER,
};

#[cfg(test)]
mod tests;
