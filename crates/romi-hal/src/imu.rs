//! Orientation and acceleration sensors.

/// Three-axis gyro reporting accumulated angles in degrees.
pub trait Gyro: Send + Sync {
    fn angle_x(&self) -> f64;
    fn angle_y(&self) -> f64;
    fn angle_z(&self) -> f64;

    /// Make the current orientation the new zero on all three axes.
    fn reset(&mut self);
}

/// Three-axis accelerometer reporting in units of g.
pub trait Accelerometer: Send + Sync {
    fn x(&self) -> f64;
    fn y(&self) -> f64;
    fn z(&self) -> f64;
}
