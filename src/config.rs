use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::detect::{validate_stub_spec, SyntheticConfig};

const DEFAULT_SOURCE: &str = "stub://crossroads";
const DEFAULT_OUTPUT_DIR: &str = "outputs";
const DEFAULT_USE_TRACKING: bool = true;
const DEFAULT_LOG_INTERVAL_FRAMES: u64 = 100;
const DEFAULT_STUB_DURATION_S: f64 = 30.0;
const DEFAULT_STUB_FPS: u32 = 10;

#[derive(Debug, Deserialize, Default)]
struct CountdConfigFile {
    source: Option<String>,
    use_tracking: Option<bool>,
    output_dir: Option<PathBuf>,
    log_interval_frames: Option<u64>,
    stub: Option<StubConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct StubConfigFile {
    duration_s: Option<f64>,
    fps: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CountdConfig {
    /// Detection source spec: `stub://<scenario>` or a detection file path.
    pub source: String,
    pub use_tracking: bool,
    pub output_dir: PathBuf,
    /// Emit a progress log line every this many frames.
    pub log_interval_frames: u64,
    pub stub: SyntheticConfig,
}

impl CountdConfig {
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("TRAFFIC_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default());
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: CountdConfigFile) -> Self {
        let stub = SyntheticConfig {
            duration_s: file
                .stub
                .as_ref()
                .and_then(|stub| stub.duration_s)
                .unwrap_or(DEFAULT_STUB_DURATION_S),
            fps: file
                .stub
                .as_ref()
                .and_then(|stub| stub.fps)
                .unwrap_or(DEFAULT_STUB_FPS),
        };
        Self {
            source: file.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            use_tracking: file.use_tracking.unwrap_or(DEFAULT_USE_TRACKING),
            output_dir: file
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            log_interval_frames: file
                .log_interval_frames
                .unwrap_or(DEFAULT_LOG_INTERVAL_FRAMES),
            stub,
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(source) = std::env::var("TRAFFIC_SOURCE") {
            if !source.trim().is_empty() {
                self.source = source;
            }
        }
        if let Ok(dir) = std::env::var("TRAFFIC_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(tracking) = std::env::var("TRAFFIC_USE_TRACKING") {
            self.use_tracking = parse_bool(&tracking)
                .ok_or_else(|| anyhow!("TRAFFIC_USE_TRACKING must be true or false"))?;
        }
        if let Ok(interval) = std::env::var("TRAFFIC_LOG_INTERVAL_FRAMES") {
            let frames: u64 = interval
                .parse()
                .map_err(|_| anyhow!("TRAFFIC_LOG_INTERVAL_FRAMES must be an integer"))?;
            self.log_interval_frames = frames;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(anyhow!("source must not be empty"));
        }
        if self.source.starts_with("stub://") {
            validate_stub_spec(&self.source)?;
        }
        if self.log_interval_frames == 0 {
            return Err(anyhow!("log_interval_frames must be greater than zero"));
        }
        if self.stub.fps == 0 {
            return Err(anyhow!("stub fps must be greater than zero"));
        }
        if !(self.stub.duration_s > 0.0) {
            return Err(anyhow!("stub duration must be greater than zero"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<CountdConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
