//! The regional metrics service.
//!
//! [`RegionalMetricsService`] prefers a fresh cache entry, then a live
//! fetch-join-derive cycle, then the built-in fallback dataset. Fetch and
//! parse errors never reach the caller; they are logged and turned into
//! fallback data.

use std::sync::Arc;

use eraswap_cache::{Clock, KeyValueStore, SystemClock, VersionedCache};
use eraswap_eurostat::{Dataset, DatasetFetcher, SourceError};
use eraswap_metrics_models::{
    MetricsProvenance, MetricsReport, MetricsSummary, ProcessedEntityMetrics,
};

use crate::config::MetricsConfig;
use crate::fallback::fallback_metrics;
use crate::join::{join_lookups, rank_and_trim};
use crate::summary::summarize;

/// Result of one live refresh cycle.
#[derive(Debug)]
enum LiveOutcome {
    Ok(Vec<ProcessedEntityMetrics>),
    NetworkFailure(SourceError),
    ParseFailure(SourceError),
}

impl From<SourceError> for LiveOutcome {
    fn from(e: SourceError) -> Self {
        if e.is_network() {
            Self::NetworkFailure(e)
        } else {
            Self::ParseFailure(e)
        }
    }
}

/// Produces per-country furniture waste metrics.
pub struct RegionalMetricsService {
    config: MetricsConfig,
    fetcher: Arc<dyn DatasetFetcher>,
    cache: VersionedCache,
}

impl RegionalMetricsService {
    /// Creates a service that timestamps cache entries with the system
    /// clock.
    #[must_use]
    pub fn new(
        config: MetricsConfig,
        fetcher: Arc<dyn DatasetFetcher>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_clock(config, fetcher, store, Arc::new(SystemClock))
    }

    /// Creates a service with an explicit clock.
    #[must_use]
    pub fn with_clock(
        config: MetricsConfig,
        fetcher: Arc<dyn DatasetFetcher>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = VersionedCache::new(store, clock, config.cache_keys(), config.cache.ttl());

        Self {
            config,
            fetcher,
            cache,
        }
    }

    /// Returns the configuration the service runs with.
    #[must_use]
    pub const fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Returns the per-country metrics, sorted by descending CO₂.
    ///
    /// Never empty: if the cache misses and the live path fails, the
    /// fallback dataset is returned.
    pub async fn get_processed_metrics(&self) -> Vec<ProcessedEntityMetrics> {
        self.get_report().await.entities
    }

    /// Like [`Self::get_processed_metrics`], but also reports whether the
    /// data came from the cache, a live fetch, or the fallback dataset.
    pub async fn get_report(&self) -> MetricsReport {
        if let Some(entities) = self.read_cache() {
            log::info!("Using cached Eurostat data ({} countries)", entities.len());
            return MetricsReport {
                provenance: MetricsProvenance::Cache,
                entities,
            };
        }

        log::info!("Fetching fresh Eurostat data...");

        match self.fetch_live().await {
            LiveOutcome::Ok(entities) => {
                if let Err(e) = self.cache.write(&entities) {
                    log::warn!("Failed to cache processed Eurostat data: {e}");
                }

                log::info!(
                    "Processed {} countries from Eurostat (excluded {} lowest emitters)",
                    entities.len(),
                    self.config.constants.trim_lowest
                );

                MetricsReport {
                    provenance: MetricsProvenance::Live,
                    entities,
                }
            }
            LiveOutcome::NetworkFailure(e) => {
                log::error!("Error fetching Eurostat data, using fallback: {e}");
                Self::fallback_report()
            }
            LiveOutcome::ParseFailure(e) => {
                log::error!("Error processing Eurostat data, using fallback: {e}");
                Self::fallback_report()
            }
        }
    }

    /// Aggregates `entities` into totals and the highlighted country.
    #[must_use]
    pub fn summarize(&self, entities: &[ProcessedEntityMetrics]) -> MetricsSummary {
        summarize(entities, &self.config)
    }

    /// Returns when the cached result was written, in Unix epoch
    /// milliseconds, or `None` if nothing is cached.
    #[must_use]
    pub fn cache_written_at(&self) -> Option<i64> {
        self.cache.written_at()
    }

    /// Returns `true` if a cached result exists and is younger than the TTL.
    #[must_use]
    pub fn is_cache_fresh(&self) -> bool {
        self.cache.is_fresh()
    }

    /// Deletes every persisted key of this service. Idempotent.
    pub fn clear_cache(&self) {
        match self.cache.clear() {
            Ok(()) => log::info!("Cleared cached Eurostat data"),
            Err(e) => log::warn!("Failed to fully clear cached Eurostat data: {e}"),
        }
    }

    fn read_cache(&self) -> Option<Vec<ProcessedEntityMetrics>> {
        self.cache
            .read::<Vec<ProcessedEntityMetrics>>()
            .filter(|entities| !entities.is_empty())
    }

    async fn fetch_live(&self) -> LiveOutcome {
        let (waste, population) = tokio::join!(
            self.fetcher.fetch_dataset(Dataset::Waste),
            self.fetcher.fetch_dataset(Dataset::Population),
        );

        let (waste, population) = match (waste, population) {
            (Ok(waste), Ok(population)) => (waste, population),
            (Err(e), _) | (_, Err(e)) => return e.into(),
        };

        let entities = rank_and_trim(
            join_lookups(&waste, &population, &self.config),
            self.config.constants.trim_lowest,
        );

        if entities.is_empty() {
            return LiveOutcome::ParseFailure(SourceError::Malformed {
                message: format!(
                    "no countries left after joining {} waste and {} population entries",
                    waste.len(),
                    population.len()
                ),
            });
        }

        LiveOutcome::Ok(entities)
    }

    fn fallback_report() -> MetricsReport {
        MetricsReport {
            provenance: MetricsProvenance::Fallback,
            entities: fallback_metrics(),
        }
    }
}

impl std::fmt::Debug for RegionalMetricsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionalMetricsService")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
