#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Regional furniture waste CO₂ metrics.
//!
//! Joins Eurostat's municipal waste per capita and population datasets by
//! country code, derives furniture waste CO₂ figures, and serves them
//! through [`RegionalMetricsService`]:
//!
//! 1. A cached result younger than the TTL is returned as is.
//! 2. Otherwise both datasets are fetched concurrently, joined (skipping
//!    aggregates and excluded countries), derived, ranked by CO₂, and the
//!    lowest emitters trimmed. The result is cached.
//! 3. If anything in step 2 fails, a fixed fallback dataset is returned
//!    and nothing is cached.

pub mod config;
pub mod derive;
pub mod fallback;
pub mod join;
pub mod service;
pub mod summary;

use std::path::Path;
use std::sync::Arc;

use eraswap_cache::FileStore;
use eraswap_eurostat::{Dataset, EurostatClient, SourceError};

pub use config::{ConfigError, MetricsConfig};
pub use service::RegionalMetricsService;

/// Builds a service that fetches from Eurostat and caches under
/// `<data_dir>/cache`.
///
/// # Errors
///
/// Returns [`SourceError`] if the HTTP client cannot be built.
pub fn production_service(
    config: MetricsConfig,
    data_dir: &Path,
) -> Result<RegionalMetricsService, SourceError> {
    let client = EurostatClient::new(
        config.endpoint(Dataset::Waste).clone(),
        config.endpoint(Dataset::Population).clone(),
        config.request_timeout(),
    )?;
    let store = FileStore::in_data_dir(data_dir);
    log::debug!("Caching metrics in {}", store.dir().display());

    Ok(RegionalMetricsService::new(
        config,
        Arc::new(client),
        Arc::new(store),
    ))
}
