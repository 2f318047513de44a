//! Pinhole-camera range estimate.
//!
//! With the camera mounted at a known height and pitch, and the target at a
//! known height, the horizontal distance to the target follows from the
//! target's vertical angle in the image:
//!
//! ```text
//! d = (h_target - h_camera) / tan(pitch_camera + pitch_target)
//! ```

/// Horizontal distance in metres from the camera to the target.
///
/// All angles are radians.  Returns `None` when the geometry is degenerate
/// (the summed pitch has a zero tangent, or an input is NaN), so callers never
/// see an infinite or NaN distance.
pub fn distance_to_target_m(
    camera_height_m: f64,
    target_height_m: f64,
    camera_pitch_rad: f64,
    target_pitch_rad: f64,
) -> Option<f64> {
    let d = (target_height_m - camera_height_m) / (camera_pitch_rad + target_pitch_rad).tan();
    d.is_finite().then_some(d)
}
