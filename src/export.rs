//! Analysis artifacts.
//!
//! A finished session is written out as three files in the output directory:
//! - `traffic_data.csv`: the per-second bucket table, chart-ready
//! - `report.json`: the report snapshot (input to `summarize`)
//! - `analysis_summary.txt`: the rendered text summary

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::category::CATEGORIES;
use crate::report::Report;
use crate::session::StreamAnalysis;
use crate::timeline::BucketRow;

pub const CSV_FILE: &str = "traffic_data.csv";
pub const REPORT_FILE: &str = "report.json";
pub const SUMMARY_FILE: &str = "analysis_summary.txt";

/// Where the artifacts of one run ended up.
#[derive(Clone, Debug)]
pub struct ArtifactPaths {
    pub csv: PathBuf,
    pub report: PathBuf,
    pub summary: PathBuf,
}

/// Write all artifacts for a finished session, creating the directory first.
pub fn write_artifacts(
    dir: &Path,
    analysis: &StreamAnalysis,
    generated_at: &str,
) -> Result<ArtifactPaths> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let paths = ArtifactPaths {
        csv: dir.join(CSV_FILE),
        report: dir.join(REPORT_FILE),
        summary: dir.join(SUMMARY_FILE),
    };

    write_bucket_csv(&paths.csv, &analysis.rows)?;
    write_report_json(&paths.report, &analysis.report)?;
    fs::write(&paths.summary, analysis.report.render_summary(generated_at))
        .with_context(|| format!("failed to write {}", paths.summary.display()))?;

    Ok(paths)
}

/// Write the bucket table with header
/// `second,cars,bikes,buses,trucks,others,total`.
pub fn write_bucket_csv(path: &Path, rows: &[BucketRow]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    write!(writer, "second")?;
    for category in CATEGORIES {
        write!(writer, ",{}", category.plural_label())?;
    }
    writeln!(writer, ",total")?;

    for row in rows {
        write!(writer, "{}", row.second)?;
        for category in CATEGORIES {
            write!(writer, ",{}", row.count(category))?;
        }
        writeln!(writer, ",{}", row.total)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_report_json(path: &Path, report: &Report) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a report artifact back (used by `summarize`).
pub fn read_report_json(path: &Path) -> Result<Report> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read report {}", path.display()))?;
    let report = serde_json::from_str(&raw)
        .with_context(|| format!("invalid report file {}", path.display()))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::identity::EntityId;
    use crate::ledger::DedupLedger;
    use crate::timeline::BucketAggregator;

    fn analysis() -> StreamAnalysis {
        let mut ledger = DedupLedger::new();
        let mut agg = BucketAggregator::new();
        agg.advance(0.3);
        ledger.observe(EntityId::Tracked(1), Category::Car);
        agg.credit(Category::Car);
        agg.advance(1.2);
        ledger.observe(EntityId::Tracked(2), Category::Truck);
        agg.credit(Category::Truck);
        let rows = agg.finish();
        let totals = ledger.into_totals();
        let report = Report::build(&rows, &totals);
        StreamAnalysis {
            rows,
            totals,
            report,
        }
    }

    #[test]
    fn writes_all_three_artifacts() {
        let dir = tempfile::tempdir().expect("temp dir");
        let paths =
            write_artifacts(dir.path(), &analysis(), "2026-01-01 12:00:00").expect("write");

        let csv = fs::read_to_string(&paths.csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "second,cars,bikes,buses,trucks,others,total"
        );
        assert_eq!(lines.next().unwrap(), "0,1,0,0,0,0,1");
        assert_eq!(lines.next().unwrap(), "1,0,0,0,1,0,1");
        assert_eq!(lines.next(), None);

        let report = read_report_json(&paths.report).expect("read report back");
        assert_eq!(report.total_vehicles, 2);

        let summary = fs::read_to_string(&paths.summary).unwrap();
        assert!(summary.contains("Total vehicles detected: 2"));
    }

    #[test]
    fn creates_nested_output_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let nested = dir.path().join("a").join("b");
        write_artifacts(&nested, &analysis(), "2026-01-01 12:00:00").expect("write");
        assert!(nested.join(CSV_FILE).is_file());
    }
}
