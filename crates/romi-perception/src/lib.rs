//! `romi-perception` – vision-side math and wire types.
//!
//! # Modules
//!
//! - [`transform`] – [`Transform3d`][transform::Transform3d] and its
//!   translation/quaternion parts, used for camera-to-target poses.
//! - [`target`] – [`PipelineResult`][target::PipelineResult] and
//!   [`TrackedTarget`][target::TrackedTarget], one frame of co-processor
//!   output.
//! - [`ambiguity`] – classifies a pose-ambiguity score as usable or
//!   unreliable.
//! - [`range`] – pinhole-camera distance estimate from target pitch.

pub mod ambiguity;
pub mod range;
pub mod target;
pub mod transform;

pub use ambiguity::{AmbiguityClass, DEFAULT_AMBIGUITY_THRESHOLD};
pub use target::{PipelineResult, TrackedTarget};
pub use transform::{Quaternion, Transform3d, Translation3d};
