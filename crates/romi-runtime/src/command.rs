//! Command lifecycle and the drivetrain motion goals.
//!
//! A [`Command`] is driven by a cyclic scheduler through four callbacks:
//!
//! | Callback | When |
//! |---|---|
//! | [`initialize`][Command::initialize] | once, when the command becomes active |
//! | [`execute`][Command::execute] | every cycle while active |
//! | [`is_finished`][Command::is_finished] | polled every cycle after `execute`; no side effects |
//! | [`end`][Command::end] | exactly once, on completion (`interrupted = false`) or preemption (`true`) |
//!
//! The drivetrain is passed into every callback instead of being stored in
//! the command, so only the scheduler's caller ever holds it mutably.
//!
//! [`MotionGoal`] provides the three drivetrain behaviours.  Each one
//! commands zero output in `end`, whatever the reason for ending.

use std::fmt;

use romi_subsystems::DriveBase;

/// A unit of robot behaviour run by the [`Scheduler`][crate::Scheduler].
pub trait Command: Send {
    /// Name used in logs and [`GoalEvent`][crate::scheduler::GoalEvent]s.
    fn name(&self) -> &str;

    fn initialize(&mut self, drive: &mut DriveBase);

    fn execute(&mut self, drive: &mut DriveBase);

    fn is_finished(&self, drive: &DriveBase) -> bool;

    fn end(&mut self, drive: &mut DriveBase, interrupted: bool);
}

/// A live joystick axis in `[-1, 1]`, sampled once per cycle.
pub type AxisSupplier = Box<dyn FnMut() -> f64 + Send>;

/// The drivetrain motion goals.
pub enum MotionGoal {
    /// Forward joystick axes to arcade drive every cycle.  Never finishes on
    /// its own.
    Teleop {
        linear: AxisSupplier,
        rotational: AxisSupplier,
    },
    /// Drive straight at a fixed speed until the average wheel distance
    /// reaches `inches`.  Open loop: no correction for drift.
    DriveDistance { speed: f64, inches: f64 },
    /// Spin in place at a fixed rotational speed until the wheels have
    /// travelled the arc length for `degrees`.  Progress comes from the
    /// encoders, not the gyro.
    TurnDegrees { speed: f64, degrees: f64 },
}

impl MotionGoal {
    pub fn teleop(
        linear: impl FnMut() -> f64 + Send + 'static,
        rotational: impl FnMut() -> f64 + Send + 'static,
    ) -> Self {
        MotionGoal::Teleop {
            linear: Box::new(linear),
            rotational: Box::new(rotational),
        }
    }

    pub fn drive_distance(speed: f64, inches: f64) -> Self {
        MotionGoal::DriveDistance { speed, inches }
    }

    pub fn turn_degrees(speed: f64, degrees: f64) -> Self {
        MotionGoal::TurnDegrees { speed, degrees }
    }
}

/// Mean of the absolute wheel distances, the arc length of an in-place turn.
fn average_turning_distance(drive: &DriveBase) -> f64 {
    (drive.left_distance_inch().abs() + drive.right_distance_inch().abs()) / 2.0
}

impl Command for MotionGoal {
    fn name(&self) -> &str {
        match self {
            MotionGoal::Teleop { .. } => "teleop",
            MotionGoal::DriveDistance { .. } => "drive_distance",
            MotionGoal::TurnDegrees { .. } => "turn_degrees",
        }
    }

    fn initialize(&mut self, drive: &mut DriveBase) {
        drive.stop();
        match self {
            MotionGoal::Teleop { .. } => {}
            MotionGoal::DriveDistance { .. } | MotionGoal::TurnDegrees { .. } => {
                drive.reset_encoders();
            }
        }
    }

    fn execute(&mut self, drive: &mut DriveBase) {
        match self {
            MotionGoal::Teleop { linear, rotational } => drive.arcade_drive(linear(), rotational()),
            MotionGoal::DriveDistance { speed, .. } => drive.arcade_drive(*speed, 0.0),
            MotionGoal::TurnDegrees { speed, .. } => drive.arcade_drive(0.0, *speed),
        }
    }

    fn is_finished(&self, drive: &DriveBase) -> bool {
        match self {
            MotionGoal::Teleop { .. } => false,
            MotionGoal::DriveDistance { inches, .. } => {
                drive.average_distance_inch().abs() >= inches.abs()
            }
            MotionGoal::TurnDegrees { degrees, .. } => {
                average_turning_distance(drive) >= drive.config().inches_per_degree() * degrees.abs()
            }
        }
    }

    fn end(&mut self, drive: &mut DriveBase, _interrupted: bool) {
        drive.stop();
    }
}

impl fmt::Debug for MotionGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionGoal::Teleop { .. } => f.write_str("Teleop"),
            MotionGoal::DriveDistance { speed, inches } => f
                .debug_struct("DriveDistance")
                .field("speed", speed)
                .field("inches", inches)
                .finish(),
            MotionGoal::TurnDegrees { speed, degrees } => f
                .debug_struct("TurnDegrees")
                .field("speed", speed)
                .field("degrees", degrees)
                .finish(),
        }
    }
}
