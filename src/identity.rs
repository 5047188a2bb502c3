//! Entity identity resolution.
//!
//! Every detection leaving this module carries a stable [`EntityId`]. In
//! tracking mode the detector's own track ids are used verbatim; without
//! tracking, ids are issued from a session-wide monotonic counter. Tracked
//! and synthetic ids live in separate namespaces so a synthetic id can never
//! collide with a numerically equal track id.

use crate::RawDetection;

/// Stable identifier for one physical vehicle across frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityId {
    /// Supplied by the external tracker.
    Tracked(i64),
    /// Issued from the session's detection counter. Never reused.
    Synthetic(u64),
}

/// Identity resolution mode for a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolverMode {
    /// The detector supplies cross-frame track ids.
    Tracking,
    /// No cross-frame identity; every detection gets a fresh synthetic id,
    /// so deduplication degenerates to counting every detection.
    DetectionOnly,
}

/// Resolves per-frame detections to stable entity ids.
///
/// The downgrade from `Tracking` to `DetectionOnly` is one-directional: once
/// the tracker has faulted, the session stays in detection-only mode until it
/// ends.
pub struct IdentityResolver {
    mode: ResolverMode,
    detection_counter: u64,
}

impl IdentityResolver {
    pub fn new(use_tracking: bool) -> Self {
        Self {
            mode: if use_tracking {
                ResolverMode::Tracking
            } else {
                ResolverMode::DetectionOnly
            },
            detection_counter: 0,
        }
    }

    pub fn mode(&self) -> ResolverMode {
        self.mode
    }

    /// Permanently downgrade to detection-only mode after a tracking fault.
    ///
    /// Non-fatal: the session continues, with reduced dedup accuracy. Logged
    /// once; repeated faults after the downgrade are ignored.
    pub fn note_tracking_fault(&mut self, detail: &str) {
        if self.mode == ResolverMode::DetectionOnly {
            return;
        }
        log::warn!(
            "tracking failed ({}); switching to detection-only mode for the rest of the stream",
            detail
        );
        self.mode = ResolverMode::DetectionOnly;
    }

    /// Resolve one frame's detections to entity ids, preserving input order.
    ///
    /// An empty frame yields an empty list and leaves the counter untouched.
    pub fn resolve(&mut self, detections: &[RawDetection]) -> Vec<EntityId> {
        if detections.is_empty() {
            return Vec::new();
        }

        if self.mode == ResolverMode::Tracking {
            let tracked: Option<Vec<EntityId>> = detections
                .iter()
                .map(|d| d.track_id.map(EntityId::Tracked))
                .collect();
            match tracked {
                Some(ids) => return ids,
                None => {
                    // Tracker produced no ids for this frame. Fall back to
                    // synthetic ids for the frame only; the mode is unchanged.
                    log::debug!(
                        "frame has {} detections without track ids; issuing synthetic ids",
                        detections.len()
                    );
                }
            }
        }

        self.issue(detections.len())
    }

    fn issue(&mut self, n: usize) -> Vec<EntityId> {
        let start = self.detection_counter;
        self.detection_counter += n as u64;
        (start..self.detection_counter)
            .map(EntityId::Synthetic)
            .collect()
    }
}
