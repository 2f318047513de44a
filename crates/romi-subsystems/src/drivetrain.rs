//! [`DriveBase`] – the differential drivetrain.
//!
//! Owns both drive motors, both wheel encoders, the gyro and the
//! accelerometer.  Motion goals drive it through [`DriveBase::arcade_drive`]
//! and read progress back as signed wheel distances in inches.
//!
//! # Arcade mixing
//!
//! A `(linear, rotational)` pair becomes per-wheel duty cycles as
//! `left = linear - rotational` and `right = linear + rotational`
//! (positive rotation turns counter-clockwise).  When either wheel would
//! exceed `[-1, 1]` both are scaled down by the same factor, so the ratio
//! between the wheels (and therefore the path curvature) is preserved.

use std::f64::consts::PI;

use romi_hal::{Accelerometer, DriveHardware, Encoder, Gyro, MotorController, encoder};
use romi_types::{DriveTelemetry, RomiError};
use serde::{Deserialize, Serialize};
use tracing::{info, trace, warn};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Geometry and output shaping for the drivetrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Wheel diameter in inches.
    pub wheel_diameter_inch: f64,
    /// Encoder pulses per wheel revolution.
    pub counts_per_revolution: f64,
    /// The left motor is inverted when this is `false`, the right motor when
    /// it is `true`.
    pub drive_inverted: bool,
    /// Effective track width for turning: wheel-placement diameter minus the
    /// tire width, in inches.
    pub track_width_inch: f64,
    /// Scale applied to both wheel commands after mixing.
    pub max_output: f64,
    /// Inputs with magnitude at or below this are treated as zero.
    pub deadband: f64,
    /// Square input magnitudes (keeping sign) for finer low-speed control.
    pub square_inputs: bool,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            wheel_diameter_inch: 2.75,
            counts_per_revolution: 1440.0,
            drive_inverted: true,
            // 149 mm wheel placement diameter - 8 mm tire width = 141 mm.
            track_width_inch: 5.551,
            max_output: 1.0,
            deadband: 0.0,
            square_inputs: false,
        }
    }
}

impl DriveConfig {
    /// Inches of travel per encoder pulse.
    pub fn distance_per_pulse_inch(&self) -> f64 {
        encoder::distance_per_pulse(self.wheel_diameter_inch, self.counts_per_revolution)
    }

    /// Arc length each wheel travels per degree of in-place rotation.
    pub fn inches_per_degree(&self) -> f64 {
        PI * self.track_width_inch / 360.0
    }

    /// Wheel diameter, pulses per revolution and track width must all be
    /// finite and positive, otherwise every distance reads NaN or infinity.
    pub fn validate(&self) -> Result<(), RomiError> {
        let geometry = [
            ("wheel_diameter_inch", self.wheel_diameter_inch),
            ("counts_per_revolution", self.counts_per_revolution),
            ("track_width_inch", self.track_width_inch),
        ];
        for (field, value) in geometry {
            if !(value.is_finite() && value > 0.0) {
                return Err(RomiError::Config(format!(
                    "drive.{field} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Mixing
// ────────────────────────────────────────────────────────────────────────────

/// Left/right wheel duty cycles, each in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WheelSpeeds {
    pub left: f64,
    pub right: f64,
}

/// Zero `value` inside `±deadband` and rescale the remainder so the output
/// still spans the full `[-1, 1]` range.
pub fn apply_deadband(value: f64, deadband: f64) -> f64 {
    if value.abs() <= deadband {
        return 0.0;
    }
    if deadband <= 0.0 || deadband >= 1.0 {
        return value;
    }
    (value - deadband.copysign(value)) / (1.0 - deadband)
}

/// Arcade-drive inverse kinematics.
///
/// Inputs are clamped to `[-1, 1]` (NaN counts as zero) before mixing.
pub fn arcade_drive_ik(linear: f64, rotational: f64, square_inputs: bool) -> WheelSpeeds {
    let shape = |v: f64| {
        let v = if v.is_nan() { 0.0 } else { v.clamp(-1.0, 1.0) };
        if square_inputs { v * v.abs() } else { v }
    };
    let linear = shape(linear);
    let rotational = shape(rotational);

    let mut left = linear - rotational;
    let mut right = linear + rotational;

    let greatest = left.abs().max(right.abs());
    if greatest > 1.0 {
        left /= greatest;
        right /= greatest;
    }
    WheelSpeeds { left, right }
}

// ────────────────────────────────────────────────────────────────────────────
// DriveBase
// ────────────────────────────────────────────────────────────────────────────

/// The robot's drivetrain.
///
/// Construct once with [`DriveBase::new`]; encoders and gyro are zeroed on
/// construction.  Every method is infallible: a motor fault is logged and
/// the command dropped.
pub struct DriveBase {
    left_motor: Box<dyn MotorController>,
    right_motor: Box<dyn MotorController>,
    left_encoder: Box<dyn Encoder>,
    right_encoder: Box<dyn Encoder>,
    gyro: Box<dyn Gyro>,
    accel: Box<dyn Accelerometer>,
    config: DriveConfig,
    distance_per_pulse: f64,
}

impl DriveBase {
    /// A config that fails [`DriveConfig::validate`] is replaced by the
    /// defaults, with a warning.
    pub fn new(hardware: DriveHardware, config: DriveConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, "invalid drive geometry, using defaults");
                DriveConfig::default()
            }
        };
        let DriveHardware {
            mut left_motor,
            mut right_motor,
            left_encoder,
            right_encoder,
            gyro,
            accel,
        } = hardware;

        left_motor.set_inverted(!config.drive_inverted);
        right_motor.set_inverted(config.drive_inverted);

        let mut drive = Self {
            left_motor,
            right_motor,
            left_encoder,
            right_encoder,
            gyro,
            accel,
            distance_per_pulse: config.distance_per_pulse_inch(),
            config,
        };
        drive.reset_encoders();
        drive.reset_gyro();
        info!(
            wheel_diameter_inch = drive.config.wheel_diameter_inch,
            counts_per_revolution = drive.config.counts_per_revolution,
            drive_inverted = drive.config.drive_inverted,
            "drive base ready"
        );
        drive
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    /// Drive with one linear and one rotational input, each in `[-1, 1]`.
    pub fn arcade_drive(&mut self, linear: f64, rotational: f64) {
        let linear = apply_deadband(linear, self.config.deadband);
        let rotational = apply_deadband(rotational, self.config.deadband);
        let speeds = arcade_drive_ik(linear, rotational, self.config.square_inputs);
        let left = speeds.left * self.config.max_output;
        let right = speeds.right * self.config.max_output;
        trace!(linear, rotational, left, right, "arcade drive");

        if let Err(e) = self.left_motor.set(left) {
            warn!(error = %e, "left drive motor rejected command");
        }
        if let Err(e) = self.right_motor.set(right) {
            warn!(error = %e, "right drive motor rejected command");
        }
    }

    /// Command both wheels to zero.
    pub fn stop(&mut self) {
        self.arcade_drive(0.0, 0.0);
    }

    /// Duty cycle last commanded to the left motor, before inversion.
    pub fn left_output(&self) -> f64 {
        self.left_motor.get()
    }

    /// Duty cycle last commanded to the right motor, before inversion.
    pub fn right_output(&self) -> f64 {
        self.right_motor.get()
    }

    pub fn reset_encoders(&mut self) {
        self.left_encoder.reset();
        self.right_encoder.reset();
    }

    pub fn left_encoder_count(&self) -> i32 {
        self.left_encoder.count()
    }

    pub fn right_encoder_count(&self) -> i32 {
        self.right_encoder.count()
    }

    pub fn left_distance_inch(&self) -> f64 {
        f64::from(self.left_encoder.count()) * self.distance_per_pulse
    }

    pub fn right_distance_inch(&self) -> f64 {
        f64::from(self.right_encoder.count()) * self.distance_per_pulse
    }

    /// Mean of the two signed wheel distances.
    pub fn average_distance_inch(&self) -> f64 {
        (self.left_distance_inch() + self.right_distance_inch()) / 2.0
    }

    pub fn reset_gyro(&mut self) {
        self.gyro.reset();
    }

    /// Angle about the X axis in degrees.
    pub fn gyro_angle_x(&self) -> f64 {
        self.gyro.angle_x()
    }

    /// Angle about the Y axis in degrees.
    pub fn gyro_angle_y(&self) -> f64 {
        self.gyro.angle_y()
    }

    /// Angle about the Z axis in degrees.
    pub fn gyro_angle_z(&self) -> f64 {
        self.gyro.angle_z()
    }

    /// Acceleration along X in g.
    pub fn accel_x(&self) -> f64 {
        self.accel.x()
    }

    /// Acceleration along Y in g.
    pub fn accel_y(&self) -> f64 {
        self.accel.y()
    }

    /// Acceleration along Z in g.
    pub fn accel_z(&self) -> f64 {
        self.accel.z()
    }

    /// Read every sensor once.
    pub fn telemetry(&self) -> DriveTelemetry {
        DriveTelemetry {
            left_count: self.left_encoder_count(),
            right_count: self.right_encoder_count(),
            left_distance_inch: self.left_distance_inch(),
            right_distance_inch: self.right_distance_inch(),
            gyro_angle_x_deg: self.gyro_angle_x(),
            gyro_angle_y_deg: self.gyro_angle_y(),
            gyro_angle_z_deg: self.gyro_angle_z(),
            accel_x_g: self.accel_x(),
            accel_y_g: self.accel_y(),
            accel_z_g: self.accel_z(),
        }
    }
}
