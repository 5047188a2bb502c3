//! Detection batch types exchanged with the external detector.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// One object observed in one frame, as reported by the detector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawDetection {
    /// Raw detector class label (e.g. "car", "motorcycle").
    pub label: String,
    /// Bounding box as x1, y1, x2, y2 in pixel coordinates.
    pub bbox: [f32; 4],
    /// Detector confidence, 0..=1.
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    /// Cross-frame track id, present only in tracking mode.
    #[serde(default)]
    pub track_id: Option<i64>,
}

fn default_confidence() -> f32 {
    1.0
}

impl RawDetection {
    /// Validate the detection contract.
    ///
    /// A violation marks the detection malformed; the caller drops it and
    /// continues the frame. One bad detection must not invalidate the
    /// session's counts.
    pub fn check(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(anyhow!("detection has an empty class label"));
        }
        if self.bbox.iter().any(|coord| !coord.is_finite()) {
            return Err(anyhow!("detection bbox has a non-finite coordinate"));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(anyhow!(
                "detection confidence {} out of bounds",
                self.confidence
            ));
        }
        Ok(())
    }
}

/// One frame's worth of detections, stamped with elapsed stream time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FrameDetections {
    /// Seconds of stream time since the start of the stream, non-decreasing.
    pub time_s: f64,
    #[serde(default)]
    pub detections: Vec<RawDetection>,
    /// Set when the tracker faulted while producing this frame. The session
    /// downgrades to detection-only mode and keeps going.
    #[serde(default)]
    pub tracking_fault: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RawDetection {
        RawDetection {
            label: "car".to_string(),
            bbox: [10.0, 20.0, 110.0, 80.0],
            confidence: 0.9,
            track_id: Some(1),
        }
    }

    #[test]
    fn valid_detection_passes() {
        assert!(valid().check().is_ok());
    }

    #[test]
    fn empty_label_is_malformed() {
        let mut d = valid();
        d.label = "  ".to_string();
        assert!(d.check().is_err());
    }

    #[test]
    fn non_finite_bbox_is_malformed() {
        let mut d = valid();
        d.bbox[2] = f32::NAN;
        assert!(d.check().is_err());
    }

    #[test]
    fn out_of_bounds_confidence_is_malformed() {
        let mut d = valid();
        d.confidence = 1.5;
        assert!(d.check().is_err());
    }

    #[test]
    fn frame_deserializes_with_defaults() {
        let frame: FrameDetections =
            serde_json::from_str(r#"{"time_s": 0.5, "detections": [{"label": "bus", "bbox": [0, 0, 5, 5]}]}"#)
                .expect("parse frame");
        assert_eq!(frame.detections.len(), 1);
        assert_eq!(frame.detections[0].confidence, 1.0);
        assert_eq!(frame.detections[0].track_id, None);
        assert!(frame.tracking_fault.is_none());
    }
}
