//! `romi-runtime` – command lifecycle, goal scheduling and process telemetry.
//!
//! # Modules
//!
//! - [`command`] – the [`Command`] lifecycle trait and the three
//!   [`MotionGoal`]s: teleop, drive-to-distance and turn-to-angle.
//! - [`scheduler`] – [`Scheduler`]: runs one command at a time against the
//!   [`DriveBase`][romi_subsystems::DriveBase], refreshing the vision cache at
//!   the start of every cycle.
//! - [`telemetry`] – [`init_tracing`]: installs the `tracing` subscriber with
//!   an optional OTLP span exporter.

pub mod command;
pub mod scheduler;
pub mod telemetry;

pub use command::{AxisSupplier, Command, MotionGoal};
pub use scheduler::{GoalEvent, Scheduler};
pub use telemetry::{LogFormat, TracerProviderGuard, init_tracing};
