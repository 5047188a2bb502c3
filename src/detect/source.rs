//! Detection source trait.

use anyhow::Result;

use crate::detect::types::FrameDetections;

/// A provider of per-frame detection batches.
///
/// # Contract
///
/// The counting core depends only on this trait, never on a concrete
/// detection engine. Implementations must:
/// - produce frames in stream order with non-decreasing `time_s`
/// - report tracker faults through `FrameDetections::tracking_fault` rather
///   than failing the stream (a tracking fault is a mode change, not an
///   error)
/// - reserve `Err` for unrecoverable stream errors (source cannot be read),
///   which abort the session
pub trait DetectionSource {
    /// Source identifier for logs.
    fn name(&self) -> &'static str;

    /// Whether the source can supply cross-frame track ids at all.
    fn tracking_available(&self) -> bool;

    /// Pull the next frame's detections. `None` means end of stream.
    fn next_frame(&mut self) -> Result<Option<FrameDetections>>;
}
