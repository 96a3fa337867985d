//! Query resolution over the screen index.
//!
//! Ties the local index, the remote document tree and the per-caller
//! selection state together: answering queries, enriching screens on demand,
//! learning screens found remotely, and bulk collection.

pub mod collect;
pub mod enrich;
pub mod remote;
pub mod resolver;

pub use collect::{CollectEvent, CollectOptions, CollectReport, Collector};
pub use enrich::{EnrichStatus, Enricher};
pub use resolver::{Confirmed, ConfirmedVia, QueryOutcome, QueryRequest, Resolver};

use screen_core::config::ScreenConfig;
use screen_core::error::ResolveError;
use screen_tree::extract::ExtractOptions;
use screen_tree::provider::FetchError;

/// Extraction settings for a configuration: the traversal cap, and the
/// project names that must never be taken as field values.
pub fn extract_options(config: &ScreenConfig) -> ExtractOptions {
    ExtractOptions {
        depth_cap: config.search.traversal_depth_cap,
        excluded_texts: config.known_projects(),
    }
}

pub(crate) fn fetch_failed(err: FetchError) -> ResolveError {
    ResolveError::RemoteFetchFailed(err.to_string())
}
