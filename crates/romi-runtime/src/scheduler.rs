//! [`Scheduler`] – cyclic executor for drivetrain commands.
//!
//! The scheduler owns the exclusive drivetrain "slot": at most one
//! [`Command`] is active at a time.  The caller invokes
//! [`Scheduler::run_cycle`] once per fixed period; each cycle it
//!
//! 1. refreshes the vision cache,
//! 2. activates the next queued command (or the default command) if idle,
//! 3. executes the active command and polls [`Command::is_finished`],
//! 4. ends the command when it finishes or exhausts its cycle budget.
//!
//! Goals never bound their own run time; a stalled goal simply never
//! finishes.  The optional cycle budget is how a caller puts an upper bound
//! on that.
//!
//! # Example
//!
//! ```rust
//! use romi_hal::sim::SimRobot;
//! use romi_runtime::{MotionGoal, Scheduler};
//! use romi_subsystems::{DriveBase, DriveConfig, Vision, VisionConfig};
//!
//! let mut hw = SimRobot::new().build();
//! let mut drive = DriveBase::new(hw.drive, DriveConfig::default());
//! let mut vision = Vision::new(hw.camera, VisionConfig::default());
//!
//! let mut scheduler = Scheduler::new();
//! scheduler.enqueue(Box::new(MotionGoal::drive_distance(0.5, 3.0)));
//!
//! while !scheduler.is_idle() {
//!     scheduler.run_cycle(&mut drive, &mut vision);
//!     hw.plant.step();
//! }
//! assert!(drive.average_distance_inch() >= 3.0);
//! ```

use std::collections::VecDeque;

use romi_subsystems::{DriveBase, Vision};
use tracing::{info, warn};

use crate::command::Command;

/// Lifecycle transitions reported by [`Scheduler::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalEvent {
    Started(String),
    Finished(String),
    /// Ended by [`Scheduler::schedule`], [`Scheduler::cancel`] or by new
    /// work displacing the default command.
    Interrupted(String),
    /// Ended because its cycle budget ran out.
    TimedOut(String),
}

struct Active {
    command: Box<dyn Command>,
    budget: Option<u32>,
    cycles: u32,
    is_default: bool,
}

struct Pending {
    command: Box<dyn Command>,
    budget: Option<u32>,
}

/// Runs one [`Command`] at a time against the drivetrain.
#[derive(Default)]
pub struct Scheduler {
    active: Option<Active>,
    queue: VecDeque<Pending>,
    default_command: Option<Box<dyn Command>>,
    default_budget: Option<u32>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give every subsequently queued command a budget of `cycles`.
    /// The default command is never budgeted.
    pub fn with_cycle_budget(mut self, cycles: u32) -> Self {
        self.default_budget = Some(cycles);
        self
    }

    /// Command run whenever nothing else is active or queued, such as
    /// joystick teleop.
    pub fn set_default_command(&mut self, command: Box<dyn Command>) {
        self.default_command = Some(command);
    }

    /// Append `command` to the queue.  It starts on a later
    /// [`run_cycle`][Self::run_cycle], after everything queued before it.
    pub fn enqueue(&mut self, command: Box<dyn Command>) {
        let budget = self.default_budget;
        self.enqueue_with_budget(command, budget);
    }

    /// Append `command` with an explicit cycle budget (`None` = unbounded).
    pub fn enqueue_with_budget(&mut self, command: Box<dyn Command>, budget: Option<u32>) {
        self.queue.push_back(Pending { command, budget });
    }

    /// Start `command` immediately, interrupting whatever is active and
    /// dropping anything queued.
    pub fn schedule(&mut self, command: Box<dyn Command>, drive: &mut DriveBase) -> Vec<GoalEvent> {
        let mut events = self.cancel(drive);
        let budget = self.default_budget;
        events.push(self.activate(command, budget, false, drive));
        events
    }

    /// Interrupt the active command and clear the queue.  The default
    /// command, if any, resumes on the next cycle.
    pub fn cancel(&mut self, drive: &mut DriveBase) -> Vec<GoalEvent> {
        self.queue.clear();
        self.interrupt_active(drive).into_iter().collect()
    }

    /// `true` when no command is active or queued.  A running default
    /// command does not count as work.
    pub fn is_idle(&self) -> bool {
        self.queue.is_empty() && self.active.as_ref().is_none_or(|a| a.is_default)
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.command.name())
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Advance one period.
    pub fn run_cycle(&mut self, drive: &mut DriveBase, vision: &mut Vision) -> Vec<GoalEvent> {
        vision.refresh();
        let mut events = Vec::new();

        // Queued work displaces the default command.
        if self.active.as_ref().is_some_and(|a| a.is_default) && !self.queue.is_empty() {
            events.extend(self.interrupt_active(drive));
        }
        if self.active.is_none() {
            if let Some(next) = self.queue.pop_front() {
                events.push(self.activate(next.command, next.budget, false, drive));
            } else if let Some(default) = self.default_command.take() {
                events.push(self.activate(default, None, true, drive));
            }
        }

        let Some(active) = self.active.as_mut() else {
            return events;
        };

        active.command.execute(drive);
        active.cycles += 1;

        if active.command.is_finished(drive) {
            active.command.end(drive, false);
            info!(goal = active.command.name(), cycles = active.cycles, "goal finished");
            events.push(GoalEvent::Finished(active.command.name().to_string()));
            self.retire();
        } else if active.budget.is_some_and(|b| active.cycles >= b) {
            active.command.end(drive, true);
            warn!(goal = active.command.name(), cycles = active.cycles, "goal exceeded its cycle budget");
            events.push(GoalEvent::TimedOut(active.command.name().to_string()));
            self.retire();
        }
        events
    }

    fn activate(
        &mut self,
        mut command: Box<dyn Command>,
        budget: Option<u32>,
        is_default: bool,
        drive: &mut DriveBase,
    ) -> GoalEvent {
        command.initialize(drive);
        info!(goal = command.name(), ?budget, is_default, "goal started");
        let event = GoalEvent::Started(command.name().to_string());
        self.active = Some(Active {
            command,
            budget,
            cycles: 0,
            is_default,
        });
        event
    }

    fn interrupt_active(&mut self, drive: &mut DriveBase) -> Option<GoalEvent> {
        let active = self.active.as_mut()?;
        active.command.end(drive, true);
        info!(goal = active.command.name(), cycles = active.cycles, "goal interrupted");
        let event = GoalEvent::Interrupted(active.command.name().to_string());
        self.retire();
        Some(event)
    }

    // Drop the active command, returning the default command to its slot.
    fn retire(&mut self) {
        match self.active.take() {
            Some(active) if active.is_default => self.default_command = Some(active.command),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::MotionGoal;
    use romi_hal::sim::{SimDrivetrain, SimHandles, SimRobot};
    use romi_subsystems::{DriveConfig, VisionConfig};

    struct Rig {
        drive: DriveBase,
        vision: Vision,
        plant: SimDrivetrain,
        handles: SimHandles,
    }

    fn rig() -> Rig {
        let hw = SimRobot::new().build();
        Rig {
            drive: DriveBase::new(hw.drive, DriveConfig::default()),
            vision: Vision::new(hw.camera, VisionConfig::default()),
            plant: hw.plant,
            handles: hw.handles,
        }
    }

    impl Rig {
        fn cycle(&mut self, scheduler: &mut Scheduler) -> Vec<GoalEvent> {
            let events = scheduler.run_cycle(&mut self.drive, &mut self.vision);
            self.plant.step();
            events
        }
    }

    fn started(name: &str) -> GoalEvent {
        GoalEvent::Started(name.to_string())
    }

    #[test]
    fn idle_scheduler_does_nothing() {
        let mut r = rig();
        let mut s = Scheduler::new();
        assert!(s.is_idle());
        assert!(r.cycle(&mut s).is_empty());
        assert_eq!(s.active_name(), None);
    }

    #[test]
    fn queued_goal_runs_to_completion_and_stops_motors() {
        let mut r = rig();
        let mut s = Scheduler::new();
        s.enqueue(Box::new(MotionGoal::drive_distance(0.5, 2.0)));
        assert!(!s.is_idle());

        let first = r.cycle(&mut s);
        assert_eq!(first, vec![started("drive_distance")]);
        assert_eq!(s.active_name(), Some("drive_distance"));

        let mut finished = false;
        for _ in 0..500 {
            let events = r.cycle(&mut s);
            if events.contains(&GoalEvent::Finished("drive_distance".to_string())) {
                finished = true;
                break;
            }
        }
        assert!(finished);
        assert!(s.is_idle());
        assert!(r.drive.average_distance_inch() >= 2.0);
        assert_eq!(r.handles.left_motor.get(), 0.0);
        assert_eq!(r.handles.right_motor.get(), 0.0);
    }

    #[test]
    fn goals_run_in_queue_order() {
        let mut r = rig();
        let mut s = Scheduler::new();
        s.enqueue(Box::new(MotionGoal::drive_distance(0.5, 1.0)));
        s.enqueue(Box::new(MotionGoal::turn_degrees(0.5, 30.0)));
        assert_eq!(s.queued(), 2);

        let mut log = Vec::new();
        for _ in 0..1000 {
            log.extend(r.cycle(&mut s));
            if s.is_idle() {
                break;
            }
        }
        assert_eq!(
            log,
            vec![
                started("drive_distance"),
                GoalEvent::Finished("drive_distance".to_string()),
                started("turn_degrees"),
                GoalEvent::Finished("turn_degrees".to_string()),
            ]
        );
    }

    #[test]
    fn stalled_goal_is_ended_by_cycle_budget() {
        let mut r = rig();
        let mut s = Scheduler::new().with_cycle_budget(5);
        // Zero speed: the encoders never move, so the goal never finishes.
        s.enqueue(Box::new(MotionGoal::drive_distance(0.0, 10.0)));

        let mut log = Vec::new();
        for _ in 0..10 {
            log.extend(r.cycle(&mut s));
        }
        assert_eq!(
            log,
            vec![started("drive_distance"), GoalEvent::TimedOut("drive_distance".to_string())]
        );
        assert!(s.is_idle());
    }

    #[test]
    fn schedule_interrupts_active_goal() {
        let mut r = rig();
        let mut s = Scheduler::new();
        s.enqueue(Box::new(MotionGoal::drive_distance(0.5, 100.0)));
        s.enqueue(Box::new(MotionGoal::drive_distance(0.5, 100.0)));
        r.cycle(&mut s);
        r.cycle(&mut s);
        assert!(r.handles.left_motor.get() > 0.0);

        let events = s.schedule(Box::new(MotionGoal::turn_degrees(0.4, 10.0)), &mut r.drive);
        assert_eq!(
            events,
            vec![GoalEvent::Interrupted("drive_distance".to_string()), started("turn_degrees")]
        );
        assert_eq!(s.queued(), 0);
        // The new goal reset the encoders on start.
        assert_eq!(r.drive.left_encoder_count(), 0);
    }

    #[test]
    fn cancel_leaves_actuators_at_zero() {
        let mut r = rig();
        let mut s = Scheduler::new();
        s.enqueue(Box::new(MotionGoal::turn_degrees(0.8, 720.0)));
        r.cycle(&mut s);
        assert!(r.handles.right_motor.get() > 0.0);

        let events = s.cancel(&mut r.drive);
        assert_eq!(events, vec![GoalEvent::Interrupted("turn_degrees".to_string())]);
        assert_eq!(r.handles.left_motor.get(), 0.0);
        assert_eq!(r.handles.right_motor.get(), 0.0);
        assert!(s.is_idle());
        assert!(s.cancel(&mut r.drive).is_empty());
    }

    #[test]
    fn default_command_yields_to_queued_work_and_resumes() {
        let mut r = rig();
        let mut s = Scheduler::new();
        s.set_default_command(Box::new(MotionGoal::teleop(|| 0.3, || 0.0)));

        assert_eq!(r.cycle(&mut s), vec![started("teleop")]);
        assert!(s.is_idle());
        assert!((r.handles.left_motor.get() - 0.3).abs() < 1e-12);

        s.enqueue(Box::new(MotionGoal::turn_degrees(0.5, 5.0)));
        let events = r.cycle(&mut s);
        assert_eq!(
            events,
            vec![GoalEvent::Interrupted("teleop".to_string()), started("turn_degrees")]
        );

        let mut log = Vec::new();
        for _ in 0..200 {
            log.extend(r.cycle(&mut s));
            if log.contains(&started("teleop")) {
                break;
            }
        }
        assert_eq!(
            log,
            vec![GoalEvent::Finished("turn_degrees".to_string()), started("teleop")]
        );
    }

    #[test]
    fn run_cycle_refreshes_vision() {
        use romi_perception::{PipelineResult, TrackedTarget};

        let mut r = rig();
        let mut s = Scheduler::new();
        r.handles.camera.publish(PipelineResult::with_target(TrackedTarget {
            yaw: 7.0,
            ..Default::default()
        }));
        assert!(!r.vision.has_target());
        r.cycle(&mut s);
        assert_eq!(r.vision.best_yaw(), 7.0);
    }
}
