//! Pose-ambiguity policy.
//!
//! The pipeline scores every solved pose with an ambiguity ratio in `[0, 1]`
//! (`-1` when no pose was solved).  Scores below the threshold are trusted.

use serde::{Deserialize, Serialize};

/// Default upper bound (exclusive) for a usable ambiguity score.
pub const DEFAULT_AMBIGUITY_THRESHOLD: f64 = 0.2;

/// Classification of a pose-ambiguity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmbiguityClass {
    /// `0 <= score < threshold`: the pose can be acted on.
    Usable,
    /// Score at or above the threshold, negative (absent), or NaN.
    Unreliable,
}

impl std::fmt::Display for AmbiguityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AmbiguityClass::Usable => write!(f, "usable"),
            AmbiguityClass::Unreliable => write!(f, "unreliable"),
        }
    }
}

/// Classify `ambiguity` against `threshold`.
pub fn classify(ambiguity: f64, threshold: f64) -> AmbiguityClass {
    if (0.0..threshold).contains(&ambiguity) {
        AmbiguityClass::Usable
    } else {
        AmbiguityClass::Unreliable
    }
}
