//! Detection sources.
//!
//! The counting core consumes per-frame detection batches through the
//! [`DetectionSource`] trait and never depends on a concrete detection
//! engine. Available sources:
//! - `stub://<scenario>` synthetic pseudo-traffic (demos, tests)
//! - local JSON-lines files of detector output
//! - scripted frame lists (tests)
//!
//! Model inference and video decoding stay outside this crate; an external
//! detector produces what these sources replay.

mod file;
mod source;
mod stub;
mod types;

use std::path::Path;

use anyhow::Result;

pub use file::JsonlSource;
pub use source::DetectionSource;
pub use stub::{validate_stub_spec, ScriptedSource, SyntheticConfig, SyntheticSource};
pub use types::{FrameDetections, RawDetection};

/// Open the detection source named by `spec`.
///
/// `stub://<scenario>` selects the synthetic generator; anything else is
/// treated as a local JSON-lines detection file.
pub fn open_source(
    spec: &str,
    tracking: bool,
    synthetic: SyntheticConfig,
) -> Result<Box<dyn DetectionSource>> {
    if spec.starts_with("stub://") {
        let source = SyntheticSource::new(spec, synthetic)?;
        Ok(Box::new(source))
    } else {
        let source = JsonlSource::open(Path::new(spec), tracking)?;
        Ok(Box::new(source))
    }
}
