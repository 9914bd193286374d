//! Metric formulas.
//!
//! Every derived field is a pure function of one country's waste per
//! capita, its population, and the [`DerivationConstants`].

use eraswap_metrics_models::ProcessedEntityMetrics;

use crate::config::DerivationConstants;

/// Unrounded metrics for one country.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    /// Municipal waste per year, kg.
    pub total_waste_kg: f64,
    /// Furniture share of the municipal waste, kg.
    pub furniture_waste_kg: f64,
    /// CO₂ from furniture waste, tons.
    pub co2_tons: f64,
    /// CO₂ still emitted after the reduction, tons.
    pub co2_with_reduction_tons: f64,
    /// CO₂ avoided through reuse, tons.
    pub co2_saved_tons: f64,
    /// Furniture items discarded per year.
    pub furniture_items: u64,
    /// CO₂ per person, kg.
    pub per_capita_co2_kg: f64,
}

/// Computes the metrics of a country with `population` inhabitants each
/// producing `waste_per_capita_kg` of municipal waste per year.
///
/// `population` must be positive.
#[must_use]
pub fn calculate_metrics(
    waste_per_capita_kg: f64,
    population: f64,
    constants: &DerivationConstants,
) -> DerivedMetrics {
    let total_waste_kg = population * waste_per_capita_kg;
    let furniture_waste_kg = total_waste_kg * constants.furniture_waste_fraction;

    let co2_kg = furniture_waste_kg * constants.co2_per_kg_furniture;
    let co2_tons = co2_kg / 1000.0;

    DerivedMetrics {
        total_waste_kg,
        furniture_waste_kg,
        co2_tons,
        co2_with_reduction_tons: co2_tons * (1.0 - constants.reduction_rate),
        co2_saved_tons: co2_tons * constants.reduction_rate,
        furniture_items: round_count(furniture_waste_kg / constants.avg_furniture_weight_kg),
        per_capita_co2_kg: co2_tons * 1000.0 / population,
    }
}

/// Builds the emitted record for one country, applying the per-field
/// rounding rules.
#[must_use]
pub fn to_processed(
    name: &str,
    short_name: &str,
    waste_per_capita_kg: f64,
    population: f64,
    constants: &DerivationConstants,
) -> ProcessedEntityMetrics {
    let metrics = calculate_metrics(waste_per_capita_kg, population, constants);

    ProcessedEntityMetrics {
        name: name.to_string(),
        short_name: short_name.to_string(),
        co2: round_count(metrics.co2_tons),
        furniture: metrics.furniture_items,
        population: round1(population / 1_000_000.0),
        per_capita: round1(metrics.per_capita_co2_kg),
        reduction: round_count(metrics.co2_saved_tons),
    }
}

/// Rounds to the nearest integer, clamping negatives and NaN to zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn round_count(value: f64) -> u64 {
    if value.is_nan() || value <= 0.0 {
        return 0;
    }
    value.round() as u64
}

/// Rounds to one decimal place.
#[must_use]
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MetricsConfig;

    fn constants() -> DerivationConstants {
        MetricsConfig::embedded().unwrap().constants
    }

    #[test]
    fn calculates_portugal_like_inputs() {
        // 10,467,366 people at 512 kg/person/year.
        let m = calculate_metrics(512.0, 10_467_366.0, &constants());

        assert!((m.total_waste_kg - 5_359_291_392.0).abs() < 1.0);
        assert!((m.furniture_waste_kg - 321_557_483.52).abs() < 1.0);
        assert!((m.co2_tons - 144_700.867_584).abs() < 1e-3);
        assert!((m.co2_saved_tons - 112_866.676_715_52).abs() < 1e-3);
        assert!((m.co2_with_reduction_tons - 31_834.190_868_48).abs() < 1e-3);
        assert_eq!(m.furniture_items, 10_718_583);
        assert!((m.per_capita_co2_kg - 13.824).abs() < 1e-9);
    }

    #[test]
    fn rounds_emitted_fields() {
        let p = to_processed("Portugal", "PT", 512.0, 10_467_366.0, &constants());

        assert_eq!(p.co2, 144_701);
        assert_eq!(p.reduction, 112_867);
        assert_eq!(p.furniture, 10_718_583);
        assert!((p.population - 10.5).abs() < f64::EPSILON);
        assert!((p.per_capita - 13.8).abs() < f64::EPSILON);
    }

    #[test]
    fn primary_metric_matches_closed_form() {
        let c = constants();
        for (waste, population) in [(300.0, 500_000.0), (777.5, 83_118_501.0), (1.0, 1.0)] {
            let p = to_processed("X", "X", waste, population, &c);
            let expected = (population
                * waste
                * c.furniture_waste_fraction
                * c.co2_per_kg_furniture
                / 1000.0)
                .round();
            assert!(
                (f64::from(u32::try_from(p.co2).unwrap()) - expected).abs() < f64::EPSILON,
                "co2 {} != {expected}",
                p.co2
            );
        }
    }

    #[test]
    fn round_count_clamps_invalid_values() {
        assert_eq!(round_count(-3.2), 0);
        assert_eq!(round_count(f64::NAN), 0);
        assert_eq!(round_count(2.5), 3);
    }

    #[test]
    fn round1_keeps_one_decimal() {
        assert!((round1(83.118_501) - 83.1).abs() < f64::EPSILON);
        assert!((round1(3.95) - 4.0).abs() < 1e-9);
    }
}
