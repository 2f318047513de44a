//! Wire types produced by the vision co-processor.
//!
//! One [`PipelineResult`] is published per processed camera frame.  The
//! co-processor sorts its detections so that the first entry is the *best*
//! target; only that one is consumed downstream.

use serde::{Deserialize, Serialize};

use crate::transform::Transform3d;

/// A single detection reported by the vision pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackedTarget {
    /// Horizontal angle to the target centre, positive right (degrees).
    pub yaw: f64,
    /// Vertical angle to the target centre, positive up (degrees).
    pub pitch: f64,
    /// Fraction of the image covered by the target (percent, 0–100).
    pub area: f64,
    pub skew: f64,
    /// Fiducial id, `-1` when the pipeline is not tracking fiducials.
    #[serde(default = "no_fiducial")]
    pub fiducial_id: i32,
    /// Ratio of best to alternate pose reprojection error, `-1` when the
    /// pipeline did not solve a pose.
    #[serde(default = "no_ambiguity")]
    pub pose_ambiguity: f64,
    /// Pose with the lowest reprojection error.
    #[serde(default)]
    pub best_camera_to_target: Transform3d,
    /// The alternate pose solution (highest reprojection error).
    #[serde(default)]
    pub alternate_camera_to_target: Transform3d,
}

fn no_fiducial() -> i32 {
    -1
}

fn no_ambiguity() -> f64 {
    -1.0
}

/// Everything the pipeline reported for one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Processing latency of this frame in milliseconds.
    #[serde(default)]
    pub latency_ms: f64,
    /// Detections, best first.
    #[serde(default)]
    pub targets: Vec<TrackedTarget>,
}

impl PipelineResult {
    /// An empty result (no detections), as published before the first frame.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result holding exactly one detection.
    pub fn with_target(target: TrackedTarget) -> Self {
        Self {
            latency_ms: 0.0,
            targets: vec![target],
        }
    }

    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    /// The best detection, if any.
    pub fn best_target(&self) -> Option<&TrackedTarget> {
        self.targets.first()
    }
}
