#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the regional furniture waste metrics pipeline.
//!
//! Raw Eurostat observations are folded into an [`EntityLookup`] per
//! dataset, joined by country code, and emitted as
//! [`ProcessedEntityMetrics`]. The JSON shape of [`ProcessedEntityMetrics`]
//! is the one the web frontend renders, so field names are camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A single country's value in one statistical dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityObservation {
    /// Human-readable label (e.g., "Portugal").
    pub name: String,
    /// Observed value. Units depend on the dataset.
    pub value: f64,
    /// Index of the country in the dataset's geo dimension. Countries
    /// with equal derived values keep this order when ranked.
    pub position: u64,
}

/// Country code (e.g., `"PT"`) to observation, built once per dataset.
///
/// Every entry has a non-empty name and a finite value.
pub type EntityLookup = BTreeMap<String, EntityObservation>;

/// Derived furniture waste metrics for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEntityMetrics {
    /// Country display name.
    pub name: String,
    /// Short country code shown in charts (Eurostat `EL` becomes `GR`).
    pub short_name: String,
    /// Tons of CO₂ per year from discarded furniture.
    pub co2: u64,
    /// Estimated furniture items discarded per year.
    pub furniture: u64,
    /// Population in millions, one decimal.
    pub population: f64,
    /// Kg of CO₂ per person per year, one decimal.
    pub per_capita: f64,
    /// Tons of CO₂ per year avoided through furniture reuse.
    pub reduction: u64,
}

/// Where a set of metrics came from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricsProvenance {
    /// Read from a still-valid cache entry.
    Cache,
    /// Freshly computed from the live Eurostat datasets.
    Live,
    /// The built-in fallback dataset, used when the live path failed.
    Fallback,
}

/// Metrics together with their provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    /// Where [`Self::entities`] came from.
    pub provenance: MetricsProvenance,
    /// Countries sorted by descending CO₂.
    pub entities: Vec<ProcessedEntityMetrics>,
}

/// The highlighted country's detail panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedEntity {
    /// The country's metrics.
    pub metrics: ProcessedEntityMetrics,
    /// Tons of CO₂ still emitted after the reduction is applied.
    pub co2_with_reduction: f64,
    /// Passenger car-years of emissions the reduction corresponds to.
    pub cars_equivalent: f64,
    /// Tree-years of absorption the reduction corresponds to.
    pub trees_equivalent: f64,
}

/// Totals across all countries plus the highlighted country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    /// Number of countries included.
    pub entity_count: usize,
    /// Sum of [`ProcessedEntityMetrics::co2`].
    pub total_co2: u64,
    /// Sum of [`ProcessedEntityMetrics::reduction`].
    pub total_reduction: u64,
    /// `None` when the highlighted country is not in the data.
    pub highlighted: Option<HighlightedEntity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_serialize_as_camel_case() {
        let metrics = ProcessedEntityMetrics {
            name: "Portugal".to_string(),
            short_name: "PT".to_string(),
            co2: 82_000,
            furniture: 580_000,
            population: 10.3,
            per_capita: 8.0,
            reduction: 63_960,
        };

        let json = serde_json::to_value(&metrics).unwrap();
        assert_eq!(json["shortName"], "PT");
        assert_eq!(json["perCapita"], 8.0);
        assert!(json.get("short_name").is_none());
    }

    #[test]
    fn provenance_round_trips_through_strum() {
        assert_eq!(MetricsProvenance::Fallback.to_string(), "FALLBACK");
        assert_eq!(
            "LIVE".parse::<MetricsProvenance>().unwrap(),
            MetricsProvenance::Live
        );
    }
}
