//! countd - streaming vehicle counting daemon
//!
//! This daemon:
//! 1. Opens the configured detection source (synthetic stub or a detection
//!    JSON-lines file produced by the external detector)
//! 2. Feeds frames through one counting session (dedup ledger + per-second
//!    aggregation)
//! 3. Flushes the trailing bucket on end of stream or ctrl-c
//! 4. Writes the bucket table CSV, report JSON and text summary

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use traffic_kernel::config::CountdConfig;
use traffic_kernel::detect::validate_stub_spec;
use traffic_kernel::{open_source, write_artifacts, CountingSession, ResolverMode};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Detection source spec: stub://<scenario> or a detection JSONL file.
    #[arg(long)]
    source: Option<String>,
    /// Directory the artifacts are written to.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Force detection-only mode even when the source supplies track ids.
    #[arg(long)]
    no_tracking: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = CountdConfig::load()?;
    if let Some(source) = args.source {
        if source.starts_with("stub://") {
            validate_stub_spec(&source)?;
        }
        cfg.source = source;
    }
    if let Some(dir) = args.output_dir {
        cfg.output_dir = dir;
    }
    if args.no_tracking {
        cfg.use_tracking = false;
    }

    let mut source = open_source(&cfg.source, cfg.use_tracking, cfg.stub.clone())?;

    let mut use_tracking = cfg.use_tracking;
    if use_tracking && !source.tracking_available() {
        log::warn!(
            "source '{}' cannot supply track ids; using detection-only mode",
            source.name()
        );
        use_tracking = false;
    }
    log::info!(
        "countd running. source={} mode={} output={}",
        cfg.source,
        if use_tracking { "tracking" } else { "detection-only" },
        cfg.output_dir.display()
    );

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let mut session = CountingSession::new(use_tracking);
    loop {
        if !running.load(Ordering::SeqCst) {
            log::warn!("stop signal received; finishing with partial results");
            break;
        }
        let Some(frame) = source.next_frame()? else {
            break;
        };
        session.process_frame(frame);

        if session.frames_processed() % cfg.log_interval_frames == 0 {
            log::info!(
                "frames={} unique={} second={}",
                session.frames_processed(),
                session.unique_count(),
                session.current_second()
            );
        }
    }

    let frames = session.frames_processed();
    let skipped = session.skipped_detections();
    let final_mode = session.mode();
    let analysis = session.finish();

    if skipped > 0 {
        log::warn!("dropped {} malformed detections", skipped);
    }
    if use_tracking && final_mode == ResolverMode::DetectionOnly {
        log::warn!("session ended in detection-only mode; counts may include re-detections");
    }

    for entry in &analysis.report.breakdown {
        log::info!(
            "{}: {} ({:.1}%)",
            entry.category.plural_label(),
            entry.count,
            entry.percent
        );
    }
    log::info!(
        "processed {} frames over {}s: {} unique vehicles, busiest second {} ({} vehicles)",
        frames,
        analysis.report.duration_s,
        analysis.report.total_vehicles,
        analysis.report.busiest.second,
        analysis.report.busiest.total
    );

    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let paths = write_artifacts(&cfg.output_dir, &analysis, &generated_at)?;
    log::info!(
        "artifacts written: {}, {}, {}",
        paths.csv.display(),
        paths.report.display(),
        paths.summary.display()
    );

    Ok(())
}
