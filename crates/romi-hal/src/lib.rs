//! `romi-hal` – hardware abstraction for the Romi drive base.
//!
//! The rest of the stack only talks to the traits defined here, so real
//! drivers and the simulated ones in [`sim`] are interchangeable.
//!
//! # Modules
//!
//! - [`motor`] – [`MotorController`]: duty-cycle motor output with inversion.
//! - [`encoder`] – [`Encoder`]: signed wheel pulse counts.
//! - [`imu`] – [`Gyro`] and [`Accelerometer`].
//! - [`dio`] – [`DigitalInput`] / [`DigitalOutput`] for buttons and LEDs.
//! - [`camera`] – [`VisionCamera`]: pull-based link to the vision co-processor.
//! - [`bundle`] – [`DriveHardware`] / [`IoHardware`] driver sets.
//! - [`ports`] – channel assignments.
//! - [`sim`] – in-process drivers and a drivetrain plant for tests and the
//!   CLI.

pub mod bundle;
pub mod camera;
pub mod dio;
pub mod encoder;
pub mod imu;
pub mod motor;
pub mod ports;
pub mod sim;

pub use bundle::{DriveHardware, IoHardware};
pub use camera::VisionCamera;
pub use dio::{DigitalInput, DigitalOutput};
pub use encoder::Encoder;
pub use imu::{Accelerometer, Gyro};
pub use motor::MotorController;
