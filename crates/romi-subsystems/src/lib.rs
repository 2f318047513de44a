//! `romi-subsystems` – the robot's hardware-owning subsystems.
//!
//! Each subsystem is built once at start-up from an owned driver bundle and
//! then passed by reference to whatever needs it.  All public operations are
//! total: hardware faults and missing vision targets are logged and resolved
//! to documented fallback values rather than returned as errors.
//!
//! # Modules
//!
//! - [`drivetrain`] – [`DriveBase`]: arcade drive, encoder distances, gyro
//!   and accelerometer pass-through.
//! - [`onboard_io`] – [`OnBoardIo`]: push button A and the three LEDs.
//! - [`vision`] – [`Vision`]: per-cycle cache of the best vision target.

pub mod drivetrain;
pub mod onboard_io;
pub mod vision;

pub use drivetrain::{DriveBase, DriveConfig, WheelSpeeds};
pub use onboard_io::OnBoardIo;
pub use vision::{BestTarget, TargetFrame, Vision, VisionConfig};
