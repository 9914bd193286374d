//! Totals and the highlighted-country detail panel.

use eraswap_metrics_models::{HighlightedEntity, MetricsSummary, ProcessedEntityMetrics};

use crate::config::MetricsConfig;

/// Aggregates `entities` and resolves the configured highlight country.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn summarize(entities: &[ProcessedEntityMetrics], config: &MetricsConfig) -> MetricsSummary {
    let c = &config.constants;

    let highlighted = entities
        .iter()
        .find(|m| m.short_name == config.highlight_code)
        .map(|m| {
            let reduction = m.reduction as f64;
            HighlightedEntity {
                metrics: m.clone(),
                co2_with_reduction: m.co2 as f64 * (1.0 - c.reduction_rate),
                cars_equivalent: reduction / c.cars_co2_tons_per_year,
                trees_equivalent: reduction * 1000.0 / c.tree_co2_kg_per_year,
            }
        });

    MetricsSummary {
        entity_count: entities.len(),
        total_co2: entities.iter().map(|m| m.co2).sum(),
        total_reduction: entities.iter().map(|m| m.reduction).sum(),
        highlighted,
    }
}
