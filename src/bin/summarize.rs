//! summarize - re-render the text summary from a saved report artifact

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use traffic_kernel::export::read_report_json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a report.json written by countd.
    #[arg(long, default_value = "outputs/report.json")]
    report: PathBuf,
    /// Write the summary here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let report = read_report_json(&args.report)?;
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let summary = report.render_summary(&generated_at);

    match args.output {
        Some(path) => {
            std::fs::write(&path, summary)?;
            log::info!("summary written to {}", path.display());
        }
        None => print!("{}", summary),
    }
    Ok(())
}
