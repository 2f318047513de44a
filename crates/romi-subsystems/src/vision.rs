//! [`Vision`] – per-cycle cache of the best vision target.
//!
//! [`Vision::refresh`] pulls the latest [`PipelineResult`] from the camera
//! once per cycle and replaces the cached [`TargetFrame`] wholesale.  All
//! accessors read only from that snapshot, so every consumer in a cycle sees
//! the same data.
//!
//! # Absent targets
//!
//! The accessors never fail.  When the frame holds no target they return:
//!
//! | Accessor | Fallback |
//! |---|---|
//! | [`best_yaw`][Vision::best_yaw], [`best_pitch`][Vision::best_pitch] | `0.0` |
//! | [`best_area`][Vision::best_area] | `-1.0` |
//! | [`best_target_ambiguity`][Vision::best_target_ambiguity] | `-1.0` |
//! | [`distance_from_target`][Vision::distance_from_target] | `-1.0` |
//! | [`camera_to_best_target`][Vision::camera_to_best_target], [`camera_to_worst_target`][Vision::camera_to_worst_target] | identity |
//! | [`is_best_target_ambiguous`][Vision::is_best_target_ambiguous] | `false` |
//!
//! Callers that would rather branch can use [`Vision::best_target`].

use romi_hal::{VisionCamera, ports};
use romi_perception::{
    AmbiguityClass, DEFAULT_AMBIGUITY_THRESHOLD, PipelineResult, Transform3d, ambiguity, range,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Camera mounting and target geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Pipeline name on the co-processor.
    pub camera_name: String,
    /// Lens height above the floor (metres).
    pub camera_height_m: f64,
    /// Target centre height above the floor (metres).
    pub target_height_m: f64,
    /// Upward tilt of the camera from horizontal (radians).
    pub camera_pitch_rad: f64,
    /// Ambiguity scores below this are usable.
    pub ambiguity_threshold: f64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            camera_name: ports::VISION_CAMERA.to_string(),
            camera_height_m: 0.15,
            target_height_m: 0.5,
            camera_pitch_rad: 15f64.to_radians(),
            ambiguity_threshold: DEFAULT_AMBIGUITY_THRESHOLD,
        }
    }
}

/// The fields of the best detection that downstream code consumes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestTarget {
    /// Degrees, positive right.
    pub yaw: f64,
    /// Degrees, positive up.
    pub pitch: f64,
    /// Percent of the image.
    pub area: f64,
    /// `-1` when the pipeline did not solve a pose.
    pub ambiguity: f64,
    pub best_camera_to_target: Transform3d,
    pub alternate_camera_to_target: Transform3d,
}

/// Snapshot of one vision frame.  `best` is `None` when nothing was seen.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TargetFrame {
    pub best: Option<BestTarget>,
    pub latency_ms: f64,
}

impl TargetFrame {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_result(result: &PipelineResult) -> Self {
        Self {
            best: result.best_target().map(|t| BestTarget {
                yaw: t.yaw,
                pitch: t.pitch,
                area: t.area,
                ambiguity: t.pose_ambiguity,
                best_camera_to_target: t.best_camera_to_target,
                alternate_camera_to_target: t.alternate_camera_to_target,
            }),
            latency_ms: result.latency_ms,
        }
    }

    pub fn has_target(&self) -> bool {
        self.best.is_some()
    }
}

/// Vision subsystem.  Build once with [`Vision::new`] and call
/// [`Vision::refresh`] exactly once per cycle.
pub struct Vision {
    camera: Box<dyn VisionCamera>,
    config: VisionConfig,
    frame: TargetFrame,
}

impl Vision {
    /// Wrap `camera` and take an initial frame.
    pub fn new(camera: Box<dyn VisionCamera>, config: VisionConfig) -> Self {
        let mut vision = Self {
            camera,
            config,
            frame: TargetFrame::empty(),
        };
        vision.refresh();
        vision
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Replace the cached frame with the camera's latest result.
    ///
    /// If the camera cannot be reached the frame is cleared, so stale
    /// detections are never reported as current.
    pub fn refresh(&mut self) {
        self.frame = match self.camera.latest_result() {
            Ok(result) => TargetFrame::from_result(&result),
            Err(e) => {
                warn!(camera = self.camera.name(), error = %e, "vision refresh failed");
                TargetFrame::empty()
            }
        };
    }

    /// The cached snapshot.
    pub fn frame(&self) -> &TargetFrame {
        &self.frame
    }

    pub fn best_target(&self) -> Option<&BestTarget> {
        self.frame.best.as_ref()
    }

    pub fn has_target(&self) -> bool {
        self.frame.has_target()
    }

    fn best_or<T>(&self, what: &str, fallback: T, f: impl FnOnce(&BestTarget) -> T) -> T {
        match self.best_target() {
            Some(t) => f(t),
            None => {
                debug!(accessor = what, "no vision target");
                fallback
            }
        }
    }

    /// Yaw of the best target in degrees, `0` without a target.
    pub fn best_yaw(&self) -> f64 {
        self.best_or("yaw", 0.0, |t| t.yaw)
    }

    /// Pitch of the best target in degrees, `0` without a target.
    pub fn best_pitch(&self) -> f64 {
        self.best_or("pitch", 0.0, |t| t.pitch)
    }

    /// Area of the best target in percent, `-1` without a target.
    pub fn best_area(&self) -> f64 {
        self.best_or("area", -1.0, |t| t.area)
    }

    /// Pose with the lowest reprojection error.
    pub fn camera_to_best_target(&self) -> Transform3d {
        self.best_or("camera_to_best_target", Transform3d::identity(), |t| {
            t.best_camera_to_target
        })
    }

    /// Alternate pose, the one with the highest reprojection error.
    pub fn camera_to_worst_target(&self) -> Transform3d {
        self.best_or("camera_to_worst_target", Transform3d::identity(), |t| {
            t.alternate_camera_to_target
        })
    }

    /// Pose-ambiguity score of the best target.  Higher is more ambiguous;
    /// `-1` without a target.
    pub fn best_target_ambiguity(&self) -> f64 {
        self.best_or("ambiguity", -1.0, |t| t.ambiguity)
    }

    /// Ambiguity policy applied to the best target.  `Unreliable` without a
    /// target, since the fallback score is `-1`.
    pub fn best_target_class(&self) -> AmbiguityClass {
        ambiguity::classify(self.best_target_ambiguity(), self.config.ambiguity_threshold)
    }

    /// `true` when the best target's ambiguity lies in
    /// `[0, ambiguity_threshold)`, i.e. when the pose is *usable*.
    ///
    /// The name reads the opposite way round; it is kept for compatibility
    /// with existing callers.  [`Vision::is_best_target_usable`] is the same
    /// predicate under an accurate name.
    pub fn is_best_target_ambiguous(&self) -> bool {
        self.best_target_class() == AmbiguityClass::Usable
    }

    pub fn is_best_target_usable(&self) -> bool {
        self.is_best_target_ambiguous()
    }

    /// Horizontal distance to the best target in metres, `-1` without a
    /// target or when the mounting geometry makes the estimate degenerate.
    pub fn distance_from_target(&self) -> f64 {
        if !self.has_target() {
            debug!(accessor = "distance", "no vision target");
            return -1.0;
        }
        range::distance_to_target_m(
            self.config.camera_height_m,
            self.config.target_height_m,
            self.config.camera_pitch_rad,
            self.best_pitch().to_radians(),
        )
        .unwrap_or(-1.0)
    }

    /// Pose of the best target in the robot frame, given where the camera is
    /// mounted on the robot.
    pub fn robot_to_best_target(&self, robot_to_camera: Transform3d) -> Option<Transform3d> {
        self.best_target()
            .map(|t| robot_to_camera.compose(t.best_camera_to_target))
    }

    /// Ask the co-processor to save its next raw input image.
    pub fn capture_preprocessed_image(&mut self) {
        self.camera.take_input_snapshot();
    }

    /// Ask the co-processor to save its next annotated output image.
    pub fn capture_postprocessed_image(&mut self) {
        self.camera.take_output_snapshot();
    }
}
