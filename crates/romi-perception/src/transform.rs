//! Rigid-body geometry for camera-to-target poses.
//!
//! The vision co-processor reports each target pose as a [`Transform3d`]
//! (translation in metres plus a unit-quaternion rotation) from the camera
//! optical frame to the target.  An absent pose is represented by
//! [`Transform3d::identity`], which is also the [`Default`].
//!
//! # Example
//!
//! ```rust
//! use romi_perception::transform::{Quaternion, Transform3d, Translation3d};
//!
//! // Camera sits 0.1 m forward of the robot centre, same orientation.
//! let robot_to_camera =
//!     Transform3d::new(Translation3d::new(0.1, 0.0, 0.0), Quaternion::identity());
//! // Target is 1.5 m in front of the camera.
//! let camera_to_target =
//!     Transform3d::new(Translation3d::new(1.5, 0.0, 0.0), Quaternion::identity());
//!
//! let robot_to_target = robot_to_camera.compose(camera_to_target);
//! assert!((robot_to_target.translation.x - 1.6).abs() < 1e-9);
//! ```

use std::ops::Mul;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Primitive types
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D translation in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Translation3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Translation3d {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero translation.
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Euclidean length.
    pub fn norm(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle_rad` about the vertical (Z) axis.
    pub fn from_yaw(angle_rad: f64) -> Self {
        let half = angle_rad / 2.0;
        Self::new(half.cos(), 0.0, 0.0, half.sin())
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Translation3d) -> Translation3d {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self * p * self.conjugate();
        Translation3d::new(rotated.x, rotated.y, rotated.z)
    }
}

impl Mul for Quaternion {
    type Output = Quaternion;

    /// Hamilton product: compose two rotations.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transform3d
// ────────────────────────────────────────────────────────────────────────────

/// A rigid-body 3-D transform: translation followed by rotation.
///
/// Represents the pose of frame B relative to frame A: to convert a point
/// expressed in frame B into frame A, rotate it by `rotation` then add
/// `translation`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform3d {
    pub translation: Translation3d,
    pub rotation: Quaternion,
}

impl Transform3d {
    pub fn new(translation: Translation3d, rotation: Quaternion) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// The identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self::new(Translation3d::zero(), Quaternion::identity())
    }

    /// Compose two transforms: `self` applied first, then `other`.
    ///
    /// If `self` = T_A_B and `other` = T_B_C, the result is T_A_C.
    pub fn compose(self, other: Self) -> Self {
        let translated = self
            .translation
            .add(self.rotation.rotate(other.translation));
        Self::new(translated, self.rotation * other.rotation)
    }

    /// Straight-line distance between the two frame origins.
    pub fn distance(self) -> f64 {
        self.translation.norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    #[test]
    fn quaternion_identity_rotate_is_noop() {
        let r = Quaternion::identity().rotate(Translation3d::new(1.0, 2.0, 3.0));
        assert!((r.x - 1.0).abs() < 1e-9);
        assert!((r.y - 2.0).abs() < 1e-9);
        assert!((r.z - 3.0).abs() < 1e-9);
    }

    #[test]
    fn quaternion_90deg_yaw_rotates_x_to_y() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let r = q.rotate(Translation3d::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < 1e-9, "x should be ~0, got {}", r.x);
        assert!((r.y - 1.0).abs() < 1e-9, "y should be ~1, got {}", r.y);
        assert!(r.z.abs() < 1e-9);
    }

    #[test]
    fn from_yaw_matches_explicit_quaternion() {
        let q = Quaternion::from_yaw(FRAC_PI_2);
        assert!((q.w - FRAC_1_SQRT_2).abs() < 1e-9);
        assert!((q.z - FRAC_1_SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn conjugate_is_inverse() {
        let q = Quaternion::from_yaw(0.7);
        let prod = q * q.conjugate();
        assert!((prod.w - 1.0).abs() < 1e-9);
        assert!(prod.x.abs() < 1e-9 && prod.y.abs() < 1e-9 && prod.z.abs() < 1e-9);
    }

    #[test]
    fn default_transform_is_identity() {
        assert_eq!(Transform3d::default(), Transform3d::identity());
        assert_eq!(Transform3d::default().distance(), 0.0);
    }

    #[test]
    fn compose_respects_rotation() {
        // Robot yawed 90°, camera 1 m forward in robot frame -> (0, 1, 0).
        let robot = Transform3d::new(Translation3d::zero(), Quaternion::from_yaw(FRAC_PI_2));
        let camera = Transform3d::new(Translation3d::new(1.0, 0.0, 0.0), Quaternion::identity());
        let t = robot.compose(camera);
        assert!(t.translation.x.abs() < 1e-9, "x={}", t.translation.x);
        assert!((t.translation.y - 1.0).abs() < 1e-9, "y={}", t.translation.y);
    }

    #[test]
    fn distance_is_translation_norm() {
        let t = Transform3d::new(Translation3d::new(3.0, 4.0, 0.0), Quaternion::identity());
        assert!((t.distance() - 5.0).abs() < 1e-12);
    }
}
