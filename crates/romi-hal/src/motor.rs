//! `MotorController` trait for speed-controlled drive motors.

use romi_types::RomiError;

/// An open-loop motor controller driven by a duty cycle in `[-1, 1]`.
///
/// Inversion flips the sign of what reaches the motor so that a positive
/// command always means "wheel forward" regardless of how the motor is
/// mounted.
pub trait MotorController: Send + Sync {
    /// PWM channel the controller is attached to.
    fn channel(&self) -> u32;

    /// Command a duty cycle.  Values outside `[-1, 1]` are clamped by the
    /// driver.
    ///
    /// # Errors
    ///
    /// Returns [`RomiError::HardwareFault`] if the command cannot be applied.
    fn set(&mut self, speed: f64) -> Result<(), RomiError>;

    /// The most recently commanded duty cycle, before inversion.
    fn get(&self) -> f64;

    fn set_inverted(&mut self, inverted: bool);

    fn is_inverted(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockMotor {
        channel: u32,
        speed: f64,
        inverted: bool,
    }

    impl MotorController for MockMotor {
        fn channel(&self) -> u32 {
            self.channel
        }

        fn set(&mut self, speed: f64) -> Result<(), RomiError> {
            self.speed = speed.clamp(-1.0, 1.0);
            Ok(())
        }

        fn get(&self) -> f64 {
            self.speed
        }

        fn set_inverted(&mut self, inverted: bool) {
            self.inverted = inverted;
        }

        fn is_inverted(&self) -> bool {
            self.inverted
        }
    }

    #[test]
    fn mock_motor_set_and_get() {
        let mut m = MockMotor {
            channel: 3,
            speed: 0.0,
            inverted: false,
        };
        assert_eq!(m.channel(), 3);
        m.set(0.4).unwrap();
        assert!((m.get() - 0.4).abs() < f64::EPSILON);
        m.set(7.0).unwrap();
        assert!((m.get() - 1.0).abs() < f64::EPSILON);
        m.set_inverted(true);
        assert!(m.is_inverted());
    }
}
