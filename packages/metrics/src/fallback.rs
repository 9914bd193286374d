//! Built-in dataset served when the live Eurostat path fails.

use eraswap_metrics_models::ProcessedEntityMetrics;

/// `(name, short_name, co2, furniture, population_millions, per_capita, reduction)`
type FallbackRow = (&'static str, &'static str, u64, u64, f64, f64, u64);

const FALLBACK_ROWS: &[FallbackRow] = &[
    ("Germany", "DE", 320_000, 2_100_000, 83.0, 3.9, 249_600),
    ("United Kingdom", "UK", 285_000, 1_800_000, 67.0, 4.3, 222_300),
    ("France", "FR", 245_000, 1_600_000, 65.0, 3.8, 191_100),
    ("Italy", "IT", 218_000, 1_500_000, 60.0, 3.6, 170_040),
    ("Spain", "ES", 192_000, 1_300_000, 47.0, 4.1, 149_760),
    ("Poland", "PL", 178_000, 1_250_000, 38.0, 4.7, 138_840),
    ("Netherlands", "NL", 95_000, 680_000, 17.5, 5.4, 74_100),
    ("Sweden", "SE", 89_000, 640_000, 10.4, 8.6, 69_420),
    ("Greece", "GR", 92_000, 650_000, 10.7, 8.6, 71_760),
    ("Portugal", "PT", 82_000, 580_000, 10.3, 8.0, 63_960),
];

/// Returns the fallback dataset, always the same ten countries in the
/// same order.
#[must_use]
pub fn fallback_metrics() -> Vec<ProcessedEntityMetrics> {
    FALLBACK_ROWS
        .iter()
        .map(
            |&(name, short_name, co2, furniture, population, per_capita, reduction)| {
                ProcessedEntityMetrics {
                    name: name.to_string(),
                    short_name: short_name.to_string(),
                    co2,
                    furniture,
                    population,
                    per_capita,
                    reduction,
                }
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_ten_countries_in_fixed_order() {
        let data = fallback_metrics();
        let codes: Vec<&str> = data.iter().map(|m| m.short_name.as_str()).collect();
        assert_eq!(
            codes,
            vec!["DE", "UK", "FR", "IT", "ES", "PL", "NL", "SE", "GR", "PT"]
        );
        assert_eq!(fallback_metrics(), data);
    }

    #[test]
    fn reduction_is_78_percent_of_co2() {
        for m in fallback_metrics() {
            assert_eq!(m.reduction, m.co2 * 78 / 100, "{}", m.name);
        }
    }
}
