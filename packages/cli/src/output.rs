//! Plain-text rendering of reports for the terminal.

use std::path::Path;

use chrono::{DateTime, Utc};
use eraswap_metrics_models::{MetricsProvenance, MetricsReport, MetricsSummary};

/// Prints the per-country ranking as a table.
pub fn print_report(report: &MetricsReport) {
    println!("=== Furniture Waste CO2 by Country ({}) ===", report.provenance);
    println!();
    println!(
        "{:<4} {:<20} {:>12} {:>14} {:>10} {:>10} {:>12}",
        "", "Country", "CO2 (t)", "Furniture", "Pop (M)", "kg/cap", "Saved (t)"
    );

    for m in &report.entities {
        println!(
            "{:<4} {:<20} {:>12} {:>14} {:>10.1} {:>10.1} {:>12}",
            m.short_name,
            truncate(&m.name, 20),
            format_thousands(m.co2),
            format_thousands(m.furniture),
            m.population,
            m.per_capita,
            format_thousands(m.reduction),
        );
    }
}

/// Prints totals and the highlighted country panel.
pub fn print_summary(provenance: MetricsProvenance, summary: &MetricsSummary) {
    println!("=== Summary ({provenance}) ===");
    println!();
    println!("Countries:        {}", summary.entity_count);
    println!(
        "CO2 from furniture (t/yr):  {}",
        format_thousands(summary.total_co2)
    );
    println!(
        "Reduction potential (t/yr): {}",
        format_thousands(summary.total_reduction)
    );

    if let Some(h) = &summary.highlighted {
        println!();
        println!("{} ({})", h.metrics.name, h.metrics.short_name);
        println!("  CO2 (t/yr):           {}", format_thousands(h.metrics.co2));
        println!(
            "  Furniture items/yr:   {}",
            format_thousands(h.metrics.furniture)
        );
        println!("  kg CO2 per capita:    {:.1}", h.metrics.per_capita);
        println!(
            "  Saved (t/yr):         {}",
            format_thousands(h.metrics.reduction)
        );
        println!("  Remaining (t/yr):     {:.0}", h.co2_with_reduction);
        println!("  Car-years avoided:    {:.0}", h.cars_equivalent);
        println!("  Tree-years:           {:.0}", h.trees_equivalent);
    }
}

/// Prints the cache location and freshness.
pub fn print_cache_status(dir: &Path, written_at: Option<i64>, fresh: bool) {
    println!("Cache dir: {}", dir.display());
    match written_at.and_then(DateTime::<Utc>::from_timestamp_millis) {
        Some(at) => println!(
            "Written:   {} ({})",
            at.format("%Y-%m-%d %H:%M:%S UTC"),
            if fresh { "fresh" } else { "expired" }
        ),
        None => println!("Written:   never"),
    }
}

/// Formats an integer with comma thousands separators (`1234567` becomes
/// `1,234,567`).
fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }

    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut t: String = s.chars().take(max_chars - 1).collect();
        t.push('…');
        t
    }
}
