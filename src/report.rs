//! Final analysis report.
//!
//! A `Report` is a derived, immutable snapshot computed once at end of
//! stream from the finished bucket rows and the final category totals. It is
//! serializable so the `summarize` tool can re-render the text summary from
//! a saved artifact.

use serde::{Deserialize, Serialize};

use crate::category::{Category, CATEGORIES};
use crate::ledger::CategoryTotals;
use crate::timeline::BucketRow;

/// Per-category slice of the final counts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub count: u64,
    /// Share of the total, 0..=100. Zero when the total is zero.
    pub percent: f64,
}

/// The second with the highest number of first observations.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BusiestSecond {
    pub second: u64,
    pub total: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    pub total_vehicles: u64,
    /// Stream duration in seconds (one per bucket row).
    pub duration_s: u64,
    pub vehicles_per_minute: f64,
    pub breakdown: Vec<CategoryBreakdown>,
    pub busiest: BusiestSecond,
    pub dominant: Category,
}

impl Report {
    /// Derive the report from the finished rows and totals.
    ///
    /// Pure and total: a zero total produces zero percentages rather than a
    /// division error, and an empty row slice (impossible via the aggregator,
    /// which always flushes at least one row, but allowed here) produces a
    /// zero-valued report.
    pub fn build(rows: &[BucketRow], totals: &CategoryTotals) -> Report {
        let total_vehicles = totals.total();
        let duration_s = rows.len() as u64;

        let breakdown = totals
            .iter()
            .map(|(category, count)| CategoryBreakdown {
                category,
                count,
                percent: percentage(count, total_vehicles),
            })
            .collect();

        let busiest = rows
            .iter()
            .fold(BusiestSecond { second: 0, total: 0 }, |best, row| {
                // Strict comparison keeps the earliest second on ties.
                if row.total > best.total {
                    BusiestSecond {
                        second: row.second,
                        total: row.total,
                    }
                } else {
                    best
                }
            });

        let dominant = CATEGORIES
            .iter()
            .fold((Category::Car, 0u64), |(best, best_count), category| {
                let count = totals.get(*category);
                if count > best_count {
                    (*category, count)
                } else {
                    (best, best_count)
                }
            })
            .0;

        let minutes = duration_s as f64 / 60.0;
        let vehicles_per_minute = if minutes > 0.0 {
            total_vehicles as f64 / minutes
        } else {
            0.0
        };

        Report {
            total_vehicles,
            duration_s,
            vehicles_per_minute,
            breakdown,
            busiest,
            dominant,
        }
    }

    /// Render the text summary artifact.
    ///
    /// `generated_at` is a preformatted timestamp; keeping it a parameter
    /// keeps rendering deterministic for tests.
    pub fn render_summary(&self, generated_at: &str) -> String {
        let mut out = String::new();
        out.push_str("=== VEHICLE DETECTION ANALYSIS SUMMARY ===\n");
        out.push_str(&format!("Generated on: {}\n\n", generated_at));

        out.push_str("OVERALL STATISTICS:\n");
        out.push_str(&format!(
            "- Analysis duration: {:.1} minutes\n",
            self.duration_s as f64 / 60.0
        ));
        out.push_str(&format!(
            "- Total vehicles detected: {}\n",
            self.total_vehicles
        ));
        out.push_str(&format!(
            "- Average traffic rate: {:.1} vehicles/minute\n\n",
            self.vehicles_per_minute
        ));

        out.push_str("VEHICLE BREAKDOWN:\n");
        for entry in &self.breakdown {
            out.push_str(&format!(
                "- {}: {} ({:.1}%)\n",
                capitalize(entry.category.plural_label()),
                entry.count,
                entry.percent
            ));
        }
        out.push('\n');

        out.push_str("TRAFFIC INSIGHTS:\n");
        out.push_str(&format!(
            "- Peak activity: {} vehicles first seen at {} seconds\n",
            self.busiest.total, self.busiest.second
        ));
        out.push_str(&format!(
            "- Most common vehicle: {}\n",
            self.dominant.label()
        ));
        out.push_str("\n=== END OF SUMMARY ===\n");
        out
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::EntityId;
    use crate::ledger::DedupLedger;
    use crate::timeline::BucketAggregator;

    fn sample() -> (Vec<BucketRow>, CategoryTotals) {
        let mut ledger = DedupLedger::new();
        let mut agg = BucketAggregator::new();
        agg.advance(0.2);
        for (id, category) in [
            (0, Category::Car),
            (1, Category::Car),
            (2, Category::Bus),
        ] {
            ledger.observe(EntityId::Synthetic(id), category);
            agg.credit(category);
        }
        agg.advance(1.1);
        ledger.observe(EntityId::Synthetic(3), Category::Bike);
        agg.credit(Category::Bike);
        (agg.finish(), ledger.into_totals())
    }

    #[test]
    fn totals_and_percentages() {
        let (rows, totals) = sample();
        let report = Report::build(&rows, &totals);
        assert_eq!(report.total_vehicles, 4);
        assert_eq!(report.duration_s, 2);

        let percent_sum: f64 = report.breakdown.iter().map(|e| e.percent).sum();
        assert!((percent_sum - 100.0).abs() < 1e-9);

        let cars = &report.breakdown[Category::Car.index()];
        assert_eq!(cars.count, 2);
        assert!((cars.percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn busiest_second_breaks_ties_earliest() {
        let (rows, totals) = sample();
        let report = Report::build(&rows, &totals);
        assert_eq!(report.busiest.second, 0);
        assert_eq!(report.busiest.total, 3);
    }

    #[test]
    fn dominant_category_prefers_declaration_order_on_ties() {
        let mut ledger = DedupLedger::new();
        ledger.observe(EntityId::Synthetic(0), Category::Bus);
        ledger.observe(EntityId::Synthetic(1), Category::Bike);
        let totals = ledger.into_totals();
        let report = Report::build(&[], &totals);
        // Bike and Bus tie at 1; Bike is declared first.
        assert_eq!(report.dominant, Category::Bike);
    }

    #[test]
    fn empty_input_produces_zero_report() {
        let totals = CategoryTotals::default();
        let report = Report::build(&[], &totals);
        assert_eq!(report.total_vehicles, 0);
        assert_eq!(report.duration_s, 0);
        assert_eq!(report.vehicles_per_minute, 0.0);
        assert_eq!(report.busiest.total, 0);
        assert_eq!(report.dominant, Category::Car);
        assert!(report.breakdown.iter().all(|e| e.percent == 0.0));
    }

    #[test]
    fn summary_lists_every_category() {
        let (rows, totals) = sample();
        let report = Report::build(&rows, &totals);
        let summary = report.render_summary("2026-01-01 00:00:00");
        for label in ["Cars:", "Bikes:", "Buses:", "Trucks:", "Others:"] {
            assert!(summary.contains(label), "missing {} in:\n{}", label, summary);
        }
        assert!(summary.contains("Total vehicles detected: 4"));
        assert!(summary.contains("Generated on: 2026-01-01 00:00:00"));
    }

    #[test]
    fn report_round_trips_through_json() {
        let (rows, totals) = sample();
        let report = Report::build(&rows, &totals);
        let json = serde_json::to_string(&report).expect("serialize");
        let back: Report = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.total_vehicles, report.total_vehicles);
        assert_eq!(back.dominant, report.dominant);
        assert_eq!(back.busiest.second, report.busiest.second);
    }
}
