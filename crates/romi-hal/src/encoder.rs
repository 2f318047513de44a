//! Quadrature wheel encoders.

/// A quadrature encoder reporting signed pulse counts.
pub trait Encoder: Send + Sync {
    /// The A channel of the encoder pair.
    fn channel(&self) -> u32;

    /// Pulses counted since the last [`reset`][Self::reset], signed by
    /// direction of rotation.
    fn count(&self) -> i32;

    /// Zero the pulse count.
    fn reset(&mut self);
}

/// Linear distance per encoder pulse for a wheel of `wheel_diameter`
/// (any length unit) and `counts_per_revolution` pulses per turn.
pub fn distance_per_pulse(wheel_diameter: f64, counts_per_revolution: f64) -> f64 {
    std::f64::consts::PI * wheel_diameter / counts_per_revolution
}
