//! Channel assignments on the robot controller.

/// PWM channel of the left drive motor.
pub const LEFT_DRIVE_MOTOR: u32 = 0;
/// PWM channel of the right drive motor.
pub const RIGHT_DRIVE_MOTOR: u32 = 1;

pub const LEFT_DRIVE_ENCODER_A: u32 = 4;
pub const LEFT_DRIVE_ENCODER_B: u32 = 5;
pub const RIGHT_DRIVE_ENCODER_A: u32 = 6;
pub const RIGHT_DRIVE_ENCODER_B: u32 = 7;

/// DIO 0: push button A (input only).
pub const BUTTON_A: u32 = 0;
/// DIO 1: green LED. Shares the line with button B.
pub const GREEN_LED: u32 = 1;
/// DIO 2: red LED. Shares the line with button C.
pub const RED_LED: u32 = 2;
/// DIO 3: yellow LED (output only).
pub const YELLOW_LED: u32 = 3;

/// Name of the camera pipeline on the vision co-processor.
pub const VISION_CAMERA: &str = "photonvision";
