//! In-process simulation drivers for running the stack without a robot.
//!
//! Every simulated driver shares its state with a cloneable *handle*, so a
//! test (or the [`SimDrivetrain`] plant) can observe motor outputs and inject
//! encoder pulses, button presses and vision frames while the driver itself
//! is owned by a subsystem.
//!
//! # Example
//!
//! ```rust
//! use romi_hal::MotorController;
//! use romi_hal::sim::SimRobot;
//!
//! let mut hw = SimRobot::new().build();
//!
//! hw.drive.left_motor.set(1.0).unwrap();
//! hw.drive.right_motor.set(1.0).unwrap();
//! hw.plant.step();
//!
//! assert!(hw.handles.left_encoder.count() > 0);
//! ```

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use romi_perception::PipelineResult;
use romi_types::RomiError;
use tracing::{debug, trace};

use crate::bundle::{DriveHardware, IoHardware};
use crate::camera::VisionCamera;
use crate::dio::{DigitalInput, DigitalOutput};
use crate::encoder::{Encoder, distance_per_pulse};
use crate::imu::{Accelerometer, Gyro};
use crate::motor::MotorController;
use crate::ports;

/// An `f64` cell shared between a driver and its handle.
#[derive(Debug, Clone, Default)]
struct SharedF64(Arc<AtomicU64>);

impl SharedF64 {
    fn new(value: f64) -> Self {
        Self(Arc::new(AtomicU64::new(value.to_bits())))
    }

    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::SeqCst))
    }

    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::SeqCst);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Motor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated motor controller that records the commanded duty cycle.
/// Always succeeds.
pub struct SimMotor {
    channel: u32,
    speed: SharedF64,
    inverted: Arc<AtomicBool>,
}

impl SimMotor {
    pub fn new(channel: u32) -> Box<Self> {
        Box::new(Self {
            channel,
            speed: SharedF64::default(),
            inverted: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn handle(&self) -> SimMotorHandle {
        SimMotorHandle {
            speed: self.speed.clone(),
            inverted: self.inverted.clone(),
        }
    }
}

impl MotorController for SimMotor {
    fn channel(&self) -> u32 {
        self.channel
    }

    fn set(&mut self, speed: f64) -> Result<(), RomiError> {
        self.speed.store(speed.clamp(-1.0, 1.0));
        Ok(())
    }

    fn get(&self) -> f64 {
        self.speed.load()
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.inverted.store(inverted, Ordering::SeqCst);
    }

    fn is_inverted(&self) -> bool {
        self.inverted.load(Ordering::SeqCst)
    }
}

/// Observer side of a [`SimMotor`].
#[derive(Debug, Clone)]
pub struct SimMotorHandle {
    speed: SharedF64,
    inverted: Arc<AtomicBool>,
}

impl SimMotorHandle {
    /// Commanded duty cycle, before inversion.
    pub fn get(&self) -> f64 {
        self.speed.load()
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted.load(Ordering::SeqCst)
    }

    /// Duty cycle actually applied to the motor terminals.
    pub fn applied_output(&self) -> f64 {
        if self.is_inverted() {
            -self.get()
        } else {
            self.get()
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Encoder
// ────────────────────────────────────────────────────────────────────────────

/// A simulated encoder whose count is advanced through its handle.
pub struct SimEncoder {
    channel: u32,
    count: Arc<AtomicI32>,
}

impl SimEncoder {
    pub fn new(channel: u32) -> Box<Self> {
        Box::new(Self {
            channel,
            count: Arc::new(AtomicI32::new(0)),
        })
    }

    pub fn handle(&self) -> SimEncoderHandle {
        SimEncoderHandle {
            count: self.count.clone(),
        }
    }
}

impl Encoder for SimEncoder {
    fn channel(&self) -> u32 {
        self.channel
    }

    fn count(&self) -> i32 {
        self.count.load(Ordering::SeqCst)
    }

    fn reset(&mut self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

/// Injector side of a [`SimEncoder`].
#[derive(Debug, Clone)]
pub struct SimEncoderHandle {
    count: Arc<AtomicI32>,
}

impl SimEncoderHandle {
    /// Add `delta` pulses (negative for reverse rotation).
    pub fn add(&self, delta: i32) {
        self.count.fetch_add(delta, Ordering::SeqCst);
    }

    pub fn set(&self, count: i32) {
        self.count.store(count, Ordering::SeqCst);
    }

    pub fn count(&self) -> i32 {
        self.count.load(Ordering::SeqCst)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gyro / accelerometer
// ────────────────────────────────────────────────────────────────────────────

/// A simulated gyro.  The handle moves the raw angles; [`Gyro::reset`]
/// captures the current raw angles as the new zero.
pub struct SimGyro {
    raw: [SharedF64; 3],
    offset: [f64; 3],
}

impl SimGyro {
    pub fn new() -> Box<Self> {
        Box::new(Self {
            raw: Default::default(),
            offset: [0.0; 3],
        })
    }

    pub fn handle(&self) -> SimGyroHandle {
        SimGyroHandle {
            raw: self.raw.clone(),
        }
    }
}

impl Gyro for SimGyro {
    fn angle_x(&self) -> f64 {
        self.raw[0].load() - self.offset[0]
    }

    fn angle_y(&self) -> f64 {
        self.raw[1].load() - self.offset[1]
    }

    fn angle_z(&self) -> f64 {
        self.raw[2].load() - self.offset[2]
    }

    fn reset(&mut self) {
        for (offset, raw) in self.offset.iter_mut().zip(&self.raw) {
            *offset = raw.load();
        }
    }
}

/// Injector side of a [`SimGyro`].
#[derive(Debug, Clone)]
pub struct SimGyroHandle {
    raw: [SharedF64; 3],
}

impl SimGyroHandle {
    pub fn set_raw(&self, x: f64, y: f64, z: f64) {
        self.raw[0].store(x);
        self.raw[1].store(y);
        self.raw[2].store(z);
    }

    /// Rotate about the vertical axis by `degrees`.
    pub fn add_z(&self, degrees: f64) {
        self.raw[2].store(self.raw[2].load() + degrees);
    }
}

/// A simulated accelerometer, at rest on level ground by default (0, 0, 1 g).
pub struct SimAccelerometer {
    axes: [SharedF64; 3],
}

impl SimAccelerometer {
    pub fn new() -> Box<Self> {
        Box::new(Self {
            axes: [SharedF64::new(0.0), SharedF64::new(0.0), SharedF64::new(1.0)],
        })
    }

    pub fn handle(&self) -> SimAccelerometerHandle {
        SimAccelerometerHandle {
            axes: self.axes.clone(),
        }
    }
}

impl Accelerometer for SimAccelerometer {
    fn x(&self) -> f64 {
        self.axes[0].load()
    }

    fn y(&self) -> f64 {
        self.axes[1].load()
    }

    fn z(&self) -> f64 {
        self.axes[2].load()
    }
}

#[derive(Debug, Clone)]
pub struct SimAccelerometerHandle {
    axes: [SharedF64; 3],
}

impl SimAccelerometerHandle {
    pub fn set(&self, x: f64, y: f64, z: f64) {
        self.axes[0].store(x);
        self.axes[1].store(y);
        self.axes[2].store(z);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Digital I/O
// ────────────────────────────────────────────────────────────────────────────

/// A simulated digital line.  Used for both inputs and outputs.
pub struct SimDigital {
    channel: u32,
    level: Arc<AtomicBool>,
}

impl SimDigital {
    pub fn new(channel: u32) -> Box<Self> {
        Box::new(Self {
            channel,
            level: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn handle(&self) -> SimDigitalHandle {
        SimDigitalHandle {
            level: self.level.clone(),
        }
    }
}

impl DigitalInput for SimDigital {
    fn channel(&self) -> u32 {
        self.channel
    }

    fn get(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

impl DigitalOutput for SimDigital {
    fn channel(&self) -> u32 {
        self.channel
    }

    fn set(&mut self, value: bool) -> Result<(), RomiError> {
        self.level.store(value, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct SimDigitalHandle {
    level: Arc<AtomicBool>,
}

impl SimDigitalHandle {
    /// Drive the line from outside (e.g. press a button).
    pub fn set(&self, value: bool) {
        self.level.store(value, Ordering::SeqCst);
    }

    pub fn get(&self) -> bool {
        self.level.load(Ordering::SeqCst)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Camera
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct CameraState {
    result: PipelineResult,
    disconnected: bool,
    input_snapshots: u32,
    output_snapshots: u32,
}

/// A simulated vision co-processor that serves whatever result was last
/// published through its handle.
pub struct SimCamera {
    name: String,
    state: Arc<Mutex<CameraState>>,
}

impl SimCamera {
    pub fn new(name: impl Into<String>) -> Box<Self> {
        Box::new(Self {
            name: name.into(),
            state: Arc::default(),
        })
    }

    pub fn handle(&self) -> SimCameraHandle {
        SimCameraHandle {
            state: self.state.clone(),
        }
    }
}

fn lock(state: &Mutex<CameraState>) -> MutexGuard<'_, CameraState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl VisionCamera for SimCamera {
    fn name(&self) -> &str {
        &self.name
    }

    fn latest_result(&mut self) -> Result<PipelineResult, RomiError> {
        let state = lock(&self.state);
        if state.disconnected {
            return Err(RomiError::hardware(
                self.name.clone(),
                "co-processor not reachable",
            ));
        }
        Ok(state.result.clone())
    }

    fn take_input_snapshot(&mut self) {
        debug!(camera = %self.name, "input snapshot requested");
        lock(&self.state).input_snapshots += 1;
    }

    fn take_output_snapshot(&mut self) {
        debug!(camera = %self.name, "output snapshot requested");
        lock(&self.state).output_snapshots += 1;
    }
}

/// Publisher side of a [`SimCamera`].
#[derive(Debug, Clone)]
pub struct SimCameraHandle {
    state: Arc<Mutex<CameraState>>,
}

impl SimCameraHandle {
    /// Make `result` the frame served by every subsequent pull.
    pub fn publish(&self, result: PipelineResult) {
        lock(&self.state).result = result;
    }

    /// Simulate losing (or regaining) the co-processor link.
    pub fn set_connected(&self, connected: bool) {
        lock(&self.state).disconnected = !connected;
    }

    pub fn input_snapshots(&self) -> u32 {
        lock(&self.state).input_snapshots
    }

    pub fn output_snapshots(&self) -> u32 {
        lock(&self.state).output_snapshots
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Drivetrain plant
// ────────────────────────────────────────────────────────────────────────────

/// Kinematic model of the drivetrain: each [`step`][Self::step] turns the
/// commanded wheel duty cycles into encoder pulses and gyro yaw.
///
/// A positive command is taken to mean "wheel forward", which is what motor
/// inversion guarantees on the real robot.  Fractional pulses are carried
/// over between steps.
pub struct SimDrivetrain {
    left_motor: SimMotorHandle,
    right_motor: SimMotorHandle,
    left_encoder: SimEncoderHandle,
    right_encoder: SimEncoderHandle,
    gyro: SimGyroHandle,
    counts_per_cycle: f64,
    inches_per_count: f64,
    track_width_inch: f64,
    left_residual: f64,
    right_residual: f64,
}

impl SimDrivetrain {
    /// Advance the plant by one control cycle.
    pub fn step(&mut self) {
        let left = Self::advance(
            self.left_motor.get() * self.counts_per_cycle,
            &mut self.left_residual,
        );
        let right = Self::advance(
            self.right_motor.get() * self.counts_per_cycle,
            &mut self.right_residual,
        );
        self.left_encoder.add(left);
        self.right_encoder.add(right);
        trace!(left, right, "plant step");

        let dl = f64::from(left) * self.inches_per_count;
        let dr = f64::from(right) * self.inches_per_count;
        self.gyro
            .add_z(((dr - dl) / self.track_width_inch).to_degrees());
    }

    fn advance(pulses: f64, residual: &mut f64) -> i32 {
        let total = pulses + *residual;
        let whole = total.trunc();
        *residual = total - whole;
        whole as i32
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRobot builder
// ────────────────────────────────────────────────────────────────────────────

/// Handles onto every simulated driver in a [`SimHardware`] set.
#[derive(Debug, Clone)]
pub struct SimHandles {
    pub left_motor: SimMotorHandle,
    pub right_motor: SimMotorHandle,
    pub left_encoder: SimEncoderHandle,
    pub right_encoder: SimEncoderHandle,
    pub gyro: SimGyroHandle,
    pub accel: SimAccelerometerHandle,
    pub button_a: SimDigitalHandle,
    pub green_led: SimDigitalHandle,
    pub red_led: SimDigitalHandle,
    pub yellow_led: SimDigitalHandle,
    pub camera: SimCameraHandle,
}

/// A complete simulated robot: driver bundles ready to hand to the
/// subsystems, plus handles and the drivetrain plant.
pub struct SimHardware {
    pub drive: DriveHardware,
    pub io: IoHardware,
    pub camera: Box<dyn VisionCamera>,
    pub handles: SimHandles,
    pub plant: SimDrivetrain,
}

/// Builder for [`SimHardware`].
///
/// Defaults model the stock chassis: 2.75 in wheels, 1440 pulses per
/// revolution, 5.551 in effective track width and 36 pulses per cycle at
/// full output.
#[derive(Debug, Clone)]
pub struct SimRobot {
    wheel_diameter_inch: f64,
    counts_per_revolution: f64,
    track_width_inch: f64,
    counts_per_cycle: f64,
    camera_name: String,
}

impl Default for SimRobot {
    fn default() -> Self {
        Self {
            wheel_diameter_inch: 2.75,
            counts_per_revolution: 1440.0,
            track_width_inch: 5.551,
            counts_per_cycle: 36.0,
            camera_name: ports::VISION_CAMERA.to_string(),
        }
    }
}

impl SimRobot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wheel and chassis geometry used by the plant to produce yaw.
    pub fn with_geometry(
        mut self,
        wheel_diameter_inch: f64,
        counts_per_revolution: f64,
        track_width_inch: f64,
    ) -> Self {
        self.wheel_diameter_inch = wheel_diameter_inch;
        self.counts_per_revolution = counts_per_revolution;
        self.track_width_inch = track_width_inch;
        self
    }

    /// Encoder pulses produced per cycle by a wheel commanded at full output.
    pub fn with_counts_per_cycle(mut self, counts_per_cycle: f64) -> Self {
        self.counts_per_cycle = counts_per_cycle;
        self
    }

    pub fn with_camera(mut self, name: impl Into<String>) -> Self {
        self.camera_name = name.into();
        self
    }

    /// Consume the builder and wire up all simulated drivers.
    pub fn build(self) -> SimHardware {
        let left_motor = SimMotor::new(ports::LEFT_DRIVE_MOTOR);
        let right_motor = SimMotor::new(ports::RIGHT_DRIVE_MOTOR);
        let left_encoder = SimEncoder::new(ports::LEFT_DRIVE_ENCODER_A);
        let right_encoder = SimEncoder::new(ports::RIGHT_DRIVE_ENCODER_A);
        let gyro = SimGyro::new();
        let accel = SimAccelerometer::new();
        let button_a = SimDigital::new(ports::BUTTON_A);
        let green_led = SimDigital::new(ports::GREEN_LED);
        let red_led = SimDigital::new(ports::RED_LED);
        let yellow_led = SimDigital::new(ports::YELLOW_LED);
        let camera = SimCamera::new(self.camera_name);

        let handles = SimHandles {
            left_motor: left_motor.handle(),
            right_motor: right_motor.handle(),
            left_encoder: left_encoder.handle(),
            right_encoder: right_encoder.handle(),
            gyro: gyro.handle(),
            accel: accel.handle(),
            button_a: button_a.handle(),
            green_led: green_led.handle(),
            red_led: red_led.handle(),
            yellow_led: yellow_led.handle(),
            camera: camera.handle(),
        };

        let plant = SimDrivetrain {
            left_motor: handles.left_motor.clone(),
            right_motor: handles.right_motor.clone(),
            left_encoder: handles.left_encoder.clone(),
            right_encoder: handles.right_encoder.clone(),
            gyro: handles.gyro.clone(),
            counts_per_cycle: self.counts_per_cycle,
            inches_per_count: distance_per_pulse(
                self.wheel_diameter_inch,
                self.counts_per_revolution,
            ),
            track_width_inch: self.track_width_inch,
            left_residual: 0.0,
            right_residual: 0.0,
        };

        SimHardware {
            drive: DriveHardware {
                left_motor,
                right_motor,
                left_encoder,
                right_encoder,
                gyro,
                accel,
            },
            io: IoHardware {
                button_a,
                green_led,
                red_led,
                yellow_led,
            },
            camera,
            handles,
            plant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use romi_perception::TrackedTarget;

    #[test]
    fn sim_motor_clamps_and_reports_applied_output() {
        let mut m = SimMotor::new(0);
        let h = m.handle();
        m.set(1.7).unwrap();
        assert!((h.get() - 1.0).abs() < f64::EPSILON);
        m.set_inverted(true);
        assert!((h.applied_output() + 1.0).abs() < f64::EPSILON);
        assert!((m.get() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sim_encoder_reset_zeroes_count() {
        let mut e = SimEncoder::new(4);
        let h = e.handle();
        h.add(250);
        h.add(-50);
        assert_eq!(e.count(), 200);
        e.reset();
        assert_eq!(e.count(), 0);
        assert_eq!(h.count(), 0);
    }

    #[test]
    fn sim_gyro_reset_captures_zero() {
        let mut g = SimGyro::new();
        let h = g.handle();
        h.set_raw(1.0, 2.0, 30.0);
        assert!((g.angle_z() - 30.0).abs() < 1e-12);
        g.reset();
        assert!(g.angle_x().abs() < 1e-12);
        assert!(g.angle_z().abs() < 1e-12);
        h.add_z(15.0);
        assert!((g.angle_z() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn sim_accelerometer_defaults_to_one_g_down() {
        let a = SimAccelerometer::new();
        assert_eq!((a.x(), a.y(), a.z()), (0.0, 0.0, 1.0));
        a.handle().set(0.5, 0.0, 0.9);
        assert!((a.x() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn sim_digital_round_trip() {
        let mut line = SimDigital::new(1);
        let h = line.handle();
        DigitalOutput::set(line.as_mut(), true).unwrap();
        assert!(h.get());
        h.set(false);
        assert!(!DigitalInput::get(line.as_ref()));
    }

    #[test]
    fn sim_camera_serves_last_published_result() {
        let mut cam = SimCamera::new("front");
        let h = cam.handle();
        assert!(!cam.latest_result().unwrap().has_targets());

        h.publish(PipelineResult::with_target(TrackedTarget {
            pitch: 4.0,
            ..Default::default()
        }));
        let a = cam.latest_result().unwrap();
        let b = cam.latest_result().unwrap();
        assert_eq!(a, b);
        assert!(a.has_targets());

        cam.take_input_snapshot();
        cam.take_output_snapshot();
        cam.take_output_snapshot();
        assert_eq!(h.input_snapshots(), 1);
        assert_eq!(h.output_snapshots(), 2);
    }

    #[test]
    fn sim_camera_disconnect_is_a_fault() {
        let mut cam = SimCamera::new("front");
        cam.handle().set_connected(false);
        assert!(matches!(
            cam.latest_result(),
            Err(RomiError::HardwareFault { .. })
        ));
    }

    #[test]
    fn plant_turns_outputs_into_pulses() {
        let mut hw = SimRobot::new().with_counts_per_cycle(10.0).build();
        hw.drive.left_motor.set(0.5).unwrap();
        hw.drive.right_motor.set(0.5).unwrap();
        for _ in 0..4 {
            hw.plant.step();
        }
        assert_eq!(hw.handles.left_encoder.count(), 20);
        assert_eq!(hw.handles.right_encoder.count(), 20);
        assert!(hw.drive.gyro.angle_z().abs() < 1e-12);
    }

    #[test]
    fn plant_carries_fractional_pulses() {
        let mut hw = SimRobot::new().with_counts_per_cycle(1.0).build();
        hw.drive.left_motor.set(0.25).unwrap();
        for _ in 0..8 {
            hw.plant.step();
        }
        assert_eq!(hw.handles.left_encoder.count(), 2);
    }

    #[test]
    fn plant_spin_in_place_yaws_counter_clockwise() {
        let mut hw = SimRobot::new().build();
        hw.drive.left_motor.set(-0.5).unwrap();
        hw.drive.right_motor.set(0.5).unwrap();
        hw.plant.step();
        assert!(hw.handles.left_encoder.count() < 0);
        assert!(hw.handles.right_encoder.count() > 0);
        assert!(hw.drive.gyro.angle_z() > 0.0);
    }
}
