//! Joins the waste and population lookups and ranks the result.

use eraswap_metrics_models::{EntityLookup, ProcessedEntityMetrics};

use crate::config::MetricsConfig;
use crate::derive::to_processed;

/// Joins the two lookups by country code and derives metrics.
///
/// Iterates the waste lookup in geo-dimension order. Excluded codes are dropped before looking
/// at the population side, so they never appear even when both datasets
/// cover them. Codes missing from the population lookup, or with a
/// non-positive value on either side, are dropped rather than
/// zero-filled.
#[must_use]
pub fn join_lookups(
    waste: &EntityLookup,
    population: &EntityLookup,
    config: &MetricsConfig,
) -> Vec<ProcessedEntityMetrics> {
    let mut ordered: Vec<_> = waste.iter().collect();
    ordered.sort_by_key(|(code, obs)| (obs.position, *code));

    let mut joined = Vec::with_capacity(ordered.len());

    for (code, waste_obs) in ordered {
        if config.countries.is_excluded(code) {
            continue;
        }

        let Some(population_obs) = population.get(code) else {
            log::debug!("No population data for {code}, skipping");
            continue;
        };

        if waste_obs.value <= 0.0 || population_obs.value <= 0.0 {
            log::debug!("Non-positive value for {code}, skipping");
            continue;
        }

        joined.push(to_processed(
            &waste_obs.name,
            config.countries.short_name(code),
            waste_obs.value,
            population_obs.value,
            &config.constants,
        ));
    }

    joined
}

/// Sorts by descending CO₂ and drops the `trim_lowest` lowest emitters.
///
/// The sort is stable, so ties keep the join order. Fewer than `trim_lowest` entities yields an empty
/// vector.
#[must_use]
pub fn rank_and_trim(
    mut entities: Vec<ProcessedEntityMetrics>,
    trim_lowest: usize,
) -> Vec<ProcessedEntityMetrics> {
    entities.sort_by(|a, b| b.co2.cmp(&a.co2));
    entities.truncate(entities.len().saturating_sub(trim_lowest));
    entities
}
