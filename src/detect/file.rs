//! Detection batches from a local JSON-lines file.
//!
//! The external detection service hands over its per-frame output as one
//! JSON object per line (`FrameDetections`). This source replays such a file
//! in stream order. It is the interchange format for running the counting
//! kernel offline, after inference has already happened elsewhere.
//!
//! The file source only accepts local paths; URL schemes are rejected.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::detect::source::DetectionSource;
use crate::detect::types::FrameDetections;

/// Replays `FrameDetections` JSON lines from a local file.
pub struct JsonlSource {
    reader: BufReader<File>,
    line_number: u64,
    tracking: bool,
}

impl JsonlSource {
    /// Open a detection batch file.
    ///
    /// `tracking` declares whether the producing detector ran with tracking;
    /// frames without track ids in a tracking file still fall back per frame.
    pub fn open(path: &Path, tracking: bool) -> Result<Self> {
        if path.to_string_lossy().contains("://") {
            return Err(anyhow!(
                "detection files must be local paths (no URL schemes)"
            ));
        }
        let file = File::open(path)
            .with_context(|| format!("failed to open detection file {}", path.display()))?;
        log::info!("JsonlSource: reading {}", path.display());
        Ok(Self {
            reader: BufReader::new(file),
            line_number: 0,
            tracking,
        })
    }
}

impl DetectionSource for JsonlSource {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn tracking_available(&self) -> bool {
        self.tracking
    }

    fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
        loop {
            let mut line = String::new();
            let read = self
                .reader
                .read_line(&mut line)
                .with_context(|| format!("read error after line {}", self.line_number))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<FrameDetections>(trimmed) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    // One unparseable frame does not invalidate the stream.
                    log::warn!("skipping malformed frame at line {}: {}", self.line_number, e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn replays_frames_and_skips_bad_lines() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            r#"{{"time_s": 0.1, "detections": [{{"label": "car", "bbox": [0, 0, 10, 10], "track_id": 1}}]}}"#
        )
        .unwrap();
        writeln!(file, "not json").unwrap();
        writeln!(file).unwrap();
        writeln!(file, r#"{{"time_s": 0.2, "detections": []}}"#).unwrap();

        let mut source = JsonlSource::open(file.path(), true).expect("open");
        let first = source.next_frame().unwrap().expect("first frame");
        assert_eq!(first.detections.len(), 1);
        let second = source.next_frame().unwrap().expect("second frame");
        assert_eq!(second.time_s, 0.2);
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn rejects_url_schemes() {
        assert!(JsonlSource::open(Path::new("rtsp://camera-1"), true).is_err());
    }
}
