use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Snapshot of every drivetrain sensor, taken once per cycle for logging.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveTelemetry {
    pub left_count: i32,
    pub right_count: i32,
    /// Signed distance driven by the left wheel since the last reset (inches).
    pub left_distance_inch: f64,
    /// Signed distance driven by the right wheel since the last reset (inches).
    pub right_distance_inch: f64,
    pub gyro_angle_x_deg: f64,
    pub gyro_angle_y_deg: f64,
    pub gyro_angle_z_deg: f64,
    /// Accelerations in units of g.
    pub accel_x_g: f64,
    pub accel_y_g: f64,
    pub accel_z_g: f64,
}

impl DriveTelemetry {
    /// Mean of the two signed wheel distances.
    pub fn average_distance_inch(&self) -> f64 {
        (self.left_distance_inch + self.right_distance_inch) / 2.0
    }
}

/// State of the on-board push button and indicator lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OperatorStatus {
    pub button_a: bool,
    pub green_led: bool,
    pub red_led: bool,
    pub yellow_led: bool,
}

/// Error type shared by hardware drivers and configuration loading.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RomiError {
    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}

impl RomiError {
    /// Shorthand for [`RomiError::HardwareFault`].
    pub fn hardware(component: impl Into<String>, details: impl Into<String>) -> Self {
        RomiError::HardwareFault {
            component: component.into(),
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn telemetry_average_distance() {
        let t = DriveTelemetry {
            left_distance_inch: 4.0,
            right_distance_inch: 6.0,
            ..Default::default()
        };
        assert!((t.average_distance_inch() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn telemetry_serializes_field_names() {
        let t = DriveTelemetry {
            left_count: 1440,
            gyro_angle_z_deg: 90.0,
            ..Default::default()
        };
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"left_count\":1440"));
        assert!(json.contains("gyro_angle_z_deg"));
        let back: DriveTelemetry = serde_json::from_str(&json).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn operator_status_defaults_to_all_off() {
        let s = OperatorStatus::default();
        assert!(!s.button_a && !s.green_led && !s.red_led && !s.yellow_led);
    }

    #[test]
    fn romi_error_display() {
        let err = RomiError::hardware("left_motor", "pwm channel busy");
        assert!(err.to_string().contains("left_motor"));
        assert!(err.to_string().contains("pwm channel busy"));

        let err2 = RomiError::Config("bad wheel diameter".to_string());
        assert!(err2.to_string().contains("Configuration Error"));
    }
}
