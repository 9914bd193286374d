//! Fixed inputs of the metrics pipeline.
//!
//! The defaults are embedded at compile time from `config/eurostat.toml`.
//! An alternate file with the same shape can be loaded with
//! [`MetricsConfig::from_file`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

use eraswap_cache::CacheKeys;
use eraswap_eurostat::{Dataset, DatasetEndpoint};
use serde::Deserialize;

const EMBEDDED_CONFIG: &str = include_str!("../config/eurostat.toml");

/// Seconds in a day, for [`CacheConfig::ttl`].
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Errors that can occur while loading a [`MetricsConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parsing failed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// I/O error (file read).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file parsed but a value is out of range.
    #[error("Invalid metrics config: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// All fixed inputs of the metrics pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Analysis year. Pinned into both dataset queries as `time`.
    pub year: u16,
    /// Country code featured in the summary detail panel.
    pub highlight_code: String,
    /// Per-request transport timeout. `None` leaves requests unbounded.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Cache key and expiry settings.
    pub cache: CacheConfig,
    /// Dataset endpoints.
    pub datasets: DatasetsConfig,
    /// Derivation constants.
    pub constants: DerivationConstants,
    /// Country filters and display names.
    pub countries: CountryConfig,
}

/// Cache key and expiry settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Key prefix (e.g., `"eurostat"`).
    pub prefix: String,
    /// Embedded in every cache key; bump to invalidate older entries.
    pub schema_version: u32,
    /// Time-to-live of a cached result, in days.
    pub ttl_days: u64,
}

impl CacheConfig {
    /// Returns the time-to-live as a [`Duration`].
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_days.saturating_mul(SECS_PER_DAY))
    }
}

/// The two dataset endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetsConfig {
    /// Municipal waste per capita.
    pub waste: DatasetEndpoint,
    /// Population on 1 January.
    pub population: DatasetEndpoint,
}

/// Constants used by the metric formulas.
#[derive(Debug, Clone, Deserialize)]
pub struct DerivationConstants {
    /// Share of municipal waste that is furniture.
    pub furniture_waste_fraction: f64,
    /// kg CO₂ per kg of discarded furniture.
    pub co2_per_kg_furniture: f64,
    /// Share of furniture CO₂ avoided through reuse.
    pub reduction_rate: f64,
    /// Average weight of one discarded furniture item, kg.
    pub avg_furniture_weight_kg: f64,
    /// Tons CO₂ per passenger car per year.
    pub cars_co2_tons_per_year: f64,
    /// kg CO₂ absorbed per tree per year.
    pub tree_co2_kg_per_year: f64,
    /// Number of lowest-emitting countries dropped from the ranking.
    pub trim_lowest: usize,
}

/// Country filters and display names.
#[derive(Debug, Clone, Deserialize)]
pub struct CountryConfig {
    /// Codes never emitted, even when both datasets have data for them.
    pub excluded: BTreeSet<String>,
    /// Eurostat code to display code overrides.
    #[serde(default)]
    pub short_names: BTreeMap<String, String>,
}

impl CountryConfig {
    /// Returns `true` if `code` is on the exclusion list.
    #[must_use]
    pub fn is_excluded(&self, code: &str) -> bool {
        self.excluded.contains(code)
    }

    /// Returns the display code for `code` (e.g., `EL` becomes `GR`).
    #[must_use]
    pub fn short_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.short_names.get(code).map_or(code, String::as_str)
    }
}

impl MetricsConfig {
    /// Returns the configuration embedded at compile time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded file is invalid, which the
    /// crate's tests rule out.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed, or
    /// validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loaded metrics config from {}", path.display());
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if parsing or validation fails.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::de::from_str(contents)?;
        config.validate()?;

        let year = config.year.to_string();
        for endpoint in [
            &mut config.datasets.waste,
            &mut config.datasets.population,
        ] {
            endpoint.query.insert("time".to_string(), year.clone());
        }

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });
        let c = &self.constants;

        for (name, value) in [
            ("furniture_waste_fraction", c.furniture_waste_fraction),
            ("reduction_rate", c.reduction_rate),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return invalid(format!("{name} must be in (0, 1], got {value}"));
            }
        }

        for (name, value) in [
            ("co2_per_kg_furniture", c.co2_per_kg_furniture),
            ("avg_furniture_weight_kg", c.avg_furniture_weight_kg),
            ("cars_co2_tons_per_year", c.cars_co2_tons_per_year),
            ("tree_co2_kg_per_year", c.tree_co2_kg_per_year),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return invalid(format!("{name} must be positive, got {value}"));
            }
        }

        if self.cache.prefix.is_empty() {
            return invalid("cache.prefix must not be empty".to_string());
        }
        if self.cache.ttl_days == 0 {
            return invalid("cache.ttl_days must be at least 1".to_string());
        }

        for (name, endpoint) in [
            ("waste", &self.datasets.waste),
            ("population", &self.datasets.population),
        ] {
            if !endpoint.url.starts_with("http://") && !endpoint.url.starts_with("https://") {
                return invalid(format!(
                    "datasets.{name}.url must be an http(s) URL, got {:?}",
                    endpoint.url
                ));
            }
        }

        Ok(())
    }

    /// Returns the endpoint for `dataset`, with the analysis year applied.
    #[must_use]
    pub const fn endpoint(&self, dataset: Dataset) -> &DatasetEndpoint {
        match dataset {
            Dataset::Waste => &self.datasets.waste,
            Dataset::Population => &self.datasets.population,
        }
    }

    /// Returns the per-request transport timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Returns the store keys of the processed result.
    ///
    /// Also owns the per-dataset raw keys (`{prefix}_waste_data_{year}`,
    /// `{prefix}_population_data_{year}`) so clearing the cache removes
    /// them too.
    #[must_use]
    pub fn cache_keys(&self) -> CacheKeys {
        let prefix = &self.cache.prefix;
        let year = self.year;

        CacheKeys::new(prefix, year, self.cache.schema_version).with_extra(
            [Dataset::Waste, Dataset::Population]
                .into_iter()
                .map(|dataset| format!("{prefix}_{dataset}_data_{year}")),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_config_is_valid() {
        let config = MetricsConfig::embedded().unwrap();
        assert_eq!(config.year, 2023);
        assert_eq!(config.cache.schema_version, 4);
        assert_eq!(config.cache.ttl(), Duration::from_secs(365 * SECS_PER_DAY));
        assert_eq!(config.constants.trim_lowest, 4);
        assert_eq!(config.highlight_code, "PT");
    }

    #[test]
    fn pins_year_into_both_queries() {
        let config = MetricsConfig::embedded().unwrap();

        let waste = config.endpoint(Dataset::Waste);
        assert_eq!(waste.query["time"], "2023");
        assert_eq!(waste.query["unit"], "KG_HAB");
        assert_eq!(waste.query["wst_oper"], "GEN");

        let population = config.endpoint(Dataset::Population);
        assert_eq!(population.query["time"], "2023");
        assert_eq!(population.query["sex"], "T");
        assert_eq!(population.query["age"], "TOTAL");
    }

    #[test]
    fn excludes_aggregates_and_maps_greece() {
        let config = MetricsConfig::embedded().unwrap();

        for code in ["EU27_2020", "EA20", "EL", "RO", "HR"] {
            assert!(config.countries.is_excluded(code), "{code} not excluded");
        }
        assert!(!config.countries.is_excluded("PT"));
        assert_eq!(config.countries.short_name("EL"), "GR");
        assert_eq!(config.countries.short_name("DE"), "DE");
    }

    #[test]
    fn cache_keys_include_raw_dataset_keys() {
        let keys = MetricsConfig::embedded().unwrap().cache_keys();
        assert_eq!(keys.payload, "eurostat_processed_data_2023_v4");
        assert_eq!(keys.timestamp, "eurostat_data_timestamp_v4");
        assert_eq!(
            keys.extra,
            vec![
                "eurostat_waste_data_2023".to_string(),
                "eurostat_population_data_2023".to_string(),
            ]
        );
    }

    #[test]
    fn rejects_out_of_range_reduction_rate() {
        let contents = EMBEDDED_CONFIG.replace("reduction_rate = 0.78", "reduction_rate = 1.5");
        let err = MetricsConfig::from_toml_str(&contents).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
    }

    #[test]
    fn rejects_non_http_url() {
        let contents = EMBEDDED_CONFIG.replace(
            "https://ec.europa.eu/eurostat/api/dissemination/statistics/1.0/data/env_wasmun",
            "ftp://example.invalid/env_wasmun",
        );
        let err = MetricsConfig::from_toml_str(&contents).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }), "{err}");
    }
}
