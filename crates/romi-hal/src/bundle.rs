//! Owned driver bundles handed to the subsystems at start-up.
//!
//! Each subsystem is constructed exactly once from one of these bundles, so
//! the drivers it holds are never shared with another owner.

use crate::dio::{DigitalInput, DigitalOutput};
use crate::encoder::Encoder;
use crate::imu::{Accelerometer, Gyro};
use crate::motor::MotorController;

/// Every driver the drivetrain needs.
pub struct DriveHardware {
    pub left_motor: Box<dyn MotorController>,
    pub right_motor: Box<dyn MotorController>,
    pub left_encoder: Box<dyn Encoder>,
    pub right_encoder: Box<dyn Encoder>,
    pub gyro: Box<dyn Gyro>,
    pub accel: Box<dyn Accelerometer>,
}

/// The on-board push button and indicator LEDs.
pub struct IoHardware {
    pub button_a: Box<dyn DigitalInput>,
    pub green_led: Box<dyn DigitalOutput>,
    pub red_led: Box<dyn DigitalOutput>,
    pub yellow_led: Box<dyn DigitalOutput>,
}
