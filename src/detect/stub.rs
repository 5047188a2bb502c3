//! Stub detection sources.
//!
//! Two implementations live here:
//! - `ScriptedSource` replays a fixed list of frames. Tests use it to drive
//!   exact scenarios through the session.
//! - `SyntheticSource` generates deterministic pseudo-traffic for a
//!   `stub://<scenario>` spec, so `countd` can run end to end without an
//!   external detector attached.
//!
//! Stub sources MUST NOT read files or touch the network.

use std::collections::VecDeque;
use std::sync::OnceLock;

use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::detect::source::DetectionSource;
use crate::detect::types::{FrameDetections, RawDetection};

/// A conforming stub spec is `stub://<scenario>` with a short lowercase
/// scenario name. Positive allowlist to keep specs unambiguous in configs.
pub fn validate_stub_spec(spec: &str) -> Result<&str> {
    static STUB_SPEC_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = STUB_SPEC_RE
        .get_or_init(|| regex::Regex::new(r"^stub://([a-z0-9_-]{1,64})$").unwrap());

    match re.captures(spec).and_then(|c| c.get(1)) {
        Some(name) => Ok(name.as_str()),
        None => Err(anyhow!(
            "stub source spec must match ^stub://[a-z0-9_-]{{1,64}}$"
        )),
    }
}

// ----------------------------------------------------------------------------
// Scripted source
// ----------------------------------------------------------------------------

/// Replays a fixed frame sequence, then ends the stream.
pub struct ScriptedSource {
    frames: VecDeque<FrameDetections>,
    tracking: bool,
}

impl ScriptedSource {
    pub fn new(frames: Vec<FrameDetections>, tracking: bool) -> Self {
        Self {
            frames: frames.into(),
            tracking,
        }
    }
}

impl DetectionSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn tracking_available(&self) -> bool {
        self.tracking
    }

    fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
        Ok(self.frames.pop_front())
    }
}

// ----------------------------------------------------------------------------
// Synthetic source (stub://)
// ----------------------------------------------------------------------------

/// Configuration for the synthetic generator.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Stream length in seconds of stream time.
    pub duration_s: f64,
    /// Frames generated per second of stream time.
    pub fps: u32,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            duration_s: 30.0,
            fps: 10,
        }
    }
}

const SYNTHETIC_LABELS: [&str; 6] = ["car", "car", "car", "bicycle", "bus", "truck"];

/// Scenario behaviors recognized by name. Any other name is plain tracked
/// traffic seeded from the name, so distinct scenarios produce distinct but
/// reproducible streams.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scenario {
    /// Tracked traffic.
    Traffic,
    /// No detections at all.
    Empty,
    /// Tracking never available; every detection arrives without an id.
    Untracked,
    /// Tracking faults halfway through the stream.
    Flaky,
}

struct ActiveVehicle {
    track_id: i64,
    label: &'static str,
    bbox: [f32; 4],
    frames_left: u32,
}

/// Deterministic pseudo-traffic generator.
///
/// Determinism matters: the same spec and config always produce the same
/// stream, so demo runs and tests are reproducible.
pub struct SyntheticSource {
    scenario: Scenario,
    rng: StdRng,
    fps: f64,
    frame_index: u64,
    total_frames: u64,
    fault_frame: Option<u64>,
    fault_raised: bool,
    active: Vec<ActiveVehicle>,
    next_track_id: i64,
}

impl SyntheticSource {
    pub fn new(spec: &str, config: SyntheticConfig) -> Result<Self> {
        let name = validate_stub_spec(spec)?;
        if config.fps == 0 {
            return Err(anyhow!("synthetic source fps must be > 0"));
        }
        if !(config.duration_s > 0.0) {
            return Err(anyhow!("synthetic source duration must be > 0"));
        }

        let scenario = match name {
            "empty" => Scenario::Empty,
            "untracked" => Scenario::Untracked,
            "flaky" => Scenario::Flaky,
            _ => Scenario::Traffic,
        };
        let total_frames = (config.duration_s * config.fps as f64).ceil() as u64;
        let fault_frame = match scenario {
            Scenario::Flaky => Some(total_frames / 2),
            _ => None,
        };

        log::info!("SyntheticSource: scenario '{}', {} frames", name, total_frames);

        Ok(Self {
            scenario,
            rng: StdRng::seed_from_u64(seed_from_name(name)),
            fps: config.fps as f64,
            frame_index: 0,
            total_frames,
            fault_frame,
            fault_raised: false,
            active: Vec::new(),
            next_track_id: 1,
        })
    }

    fn tracking_faulted(&self) -> bool {
        self.fault_raised
    }

    fn step_vehicles(&mut self) {
        self.active.retain(|vehicle| vehicle.frames_left > 0);
        for vehicle in &mut self.active {
            vehicle.frames_left -= 1;
            // Drift across the frame left to right.
            vehicle.bbox[0] += 4.0;
            vehicle.bbox[2] += 4.0;
        }

        if self.scenario != Scenario::Empty && self.rng.gen_bool(0.2) {
            let label = SYNTHETIC_LABELS[self.rng.gen_range(0..SYNTHETIC_LABELS.len())];
            let y = self.rng.gen_range(80.0..400.0);
            self.active.push(ActiveVehicle {
                track_id: self.next_track_id,
                label,
                bbox: [0.0, y, 90.0, y + 60.0],
                frames_left: self.rng.gen_range(10..40),
            });
            self.next_track_id += 1;
        }
    }
}

impl DetectionSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn tracking_available(&self) -> bool {
        self.scenario != Scenario::Untracked
    }

    fn next_frame(&mut self) -> Result<Option<FrameDetections>> {
        if self.frame_index >= self.total_frames {
            return Ok(None);
        }
        let time_s = self.frame_index as f64 / self.fps;

        let tracking_fault = match self.fault_frame {
            Some(at) if self.frame_index == at && !self.fault_raised => {
                self.fault_raised = true;
                Some("synthetic tracker fault".to_string())
            }
            _ => None,
        };

        self.step_vehicles();
        let with_ids = self.scenario != Scenario::Untracked && !self.tracking_faulted();
        let detections = self
            .active
            .iter()
            .map(|vehicle| RawDetection {
                label: vehicle.label.to_string(),
                bbox: vehicle.bbox,
                confidence: 0.9,
                track_id: if with_ids { Some(vehicle.track_id) } else { None },
            })
            .collect();

        self.frame_index += 1;
        Ok(Some(FrameDetections {
            time_s,
            detections,
            tracking_fault,
        }))
    }
}

fn seed_from_name(name: &str) -> u64 {
    name.bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |acc, byte| {
            (acc ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &mut SyntheticSource) -> Vec<FrameDetections> {
        let mut frames = Vec::new();
        while let Some(frame) = source.next_frame().expect("synthetic frame") {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn rejects_bad_specs() {
        assert!(validate_stub_spec("stub://Main-Street").is_err());
        assert!(validate_stub_spec("file://x").is_err());
        assert!(validate_stub_spec("stub://").is_err());
        assert_eq!(validate_stub_spec("stub://rush_hour").unwrap(), "rush_hour");
    }

    #[test]
    fn same_spec_is_deterministic() {
        let config = SyntheticConfig {
            duration_s: 5.0,
            fps: 10,
        };
        let a = drain(&mut SyntheticSource::new("stub://rush_hour", config.clone()).unwrap());
        let b = drain(&mut SyntheticSource::new("stub://rush_hour", config).unwrap());
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.detections.len(), y.detections.len());
        }
    }

    #[test]
    fn empty_scenario_has_no_detections() {
        let config = SyntheticConfig {
            duration_s: 3.0,
            fps: 5,
        };
        let frames = drain(&mut SyntheticSource::new("stub://empty", config).unwrap());
        assert_eq!(frames.len(), 15);
        assert!(frames.iter().all(|f| f.detections.is_empty()));
    }

    #[test]
    fn flaky_scenario_faults_once_then_drops_ids() {
        let config = SyntheticConfig {
            duration_s: 6.0,
            fps: 10,
        };
        let frames = drain(&mut SyntheticSource::new("stub://flaky", config).unwrap());
        let faults: Vec<usize> = frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.tracking_fault.is_some())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(faults, vec![30]);
        for frame in &frames[30..] {
            assert!(frame.detections.iter().all(|d| d.track_id.is_none()));
        }
        for frame in &frames[..30] {
            assert!(frame.detections.iter().all(|d| d.track_id.is_some()));
        }
    }

    #[test]
    fn untracked_scenario_reports_no_tracking() {
        let source = SyntheticSource::new(
            "stub://untracked",
            SyntheticConfig {
                duration_s: 1.0,
                fps: 5,
            },
        )
        .unwrap();
        assert!(!source.tracking_available());
    }

    #[test]
    fn frame_times_advance_at_fps() {
        let config = SyntheticConfig {
            duration_s: 2.0,
            fps: 4,
        };
        let frames = drain(&mut SyntheticSource::new("stub://side_road", config).unwrap());
        assert_eq!(frames.len(), 8);
        assert_eq!(frames[0].time_s, 0.0);
        assert_eq!(frames[4].time_s, 1.0);
    }
}
