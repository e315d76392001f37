//! Search query module
//!
//! Builds guild message search URLs and owns the single mutable part of a
//! query: the `min_id` lower bound that moves when the cursor advances.
//!
//! # Overview
//!
//! - `QueryBuilder` - Validates the guild id and assembles filter parameters
//! - `SearchQuery` - Base URL plus ordered parameters, rendered per request
//! - `Bound` - A lower/upper bound given as a snowflake or a timestamp

mod types;

pub use types::{Bound, QueryBuilder, SearchQuery, MAX_ID_PARAM, MIN_ID_PARAM, OFFSET_PARAM};
