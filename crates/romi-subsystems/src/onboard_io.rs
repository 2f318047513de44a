//! [`OnBoardIo`] – push button and indicator LEDs on the controller board.
//!
//! DIO 0 is button A (input only).  DIO 1 and DIO 2 are shared between
//! buttons B/C and the green/red LEDs; they are used as LED outputs here.
//! DIO 3 is the yellow LED (output only).

use romi_hal::{DigitalInput, DigitalOutput, IoHardware};
use romi_types::OperatorStatus;
use tracing::warn;

pub struct OnBoardIo {
    button_a: Box<dyn DigitalInput>,
    green_led: Box<dyn DigitalOutput>,
    red_led: Box<dyn DigitalOutput>,
    yellow_led: Box<dyn DigitalOutput>,
}

impl OnBoardIo {
    pub fn new(hardware: IoHardware) -> Self {
        Self {
            button_a: hardware.button_a,
            green_led: hardware.green_led,
            red_led: hardware.red_led,
            yellow_led: hardware.yellow_led,
        }
    }

    pub fn button_a_pressed(&self) -> bool {
        self.button_a.get()
    }

    pub fn set_green_led(&mut self, on: bool) {
        Self::write(self.green_led.as_mut(), "green", on);
    }

    pub fn set_red_led(&mut self, on: bool) {
        Self::write(self.red_led.as_mut(), "red", on);
    }

    pub fn set_yellow_led(&mut self, on: bool) {
        Self::write(self.yellow_led.as_mut(), "yellow", on);
    }

    /// Button and LED levels in one snapshot.
    pub fn status(&self) -> OperatorStatus {
        OperatorStatus {
            button_a: self.button_a.get(),
            green_led: self.green_led.get(),
            red_led: self.red_led.get(),
            yellow_led: self.yellow_led.get(),
        }
    }

    fn write(line: &mut dyn DigitalOutput, color: &str, on: bool) {
        if let Err(e) = line.set(on) {
            warn!(led = color, channel = line.channel(), error = %e, "LED write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use romi_hal::sim::SimRobot;

    #[test]
    fn button_reflects_input_line() {
        let hw = SimRobot::new().build();
        let io = OnBoardIo::new(hw.io);
        assert!(!io.button_a_pressed());
        hw.handles.button_a.set(true);
        assert!(io.button_a_pressed());
    }

    #[test]
    fn leds_drive_their_own_lines() {
        let hw = SimRobot::new().build();
        let mut io = OnBoardIo::new(hw.io);
        io.set_green_led(true);
        io.set_yellow_led(true);
        assert!(hw.handles.green_led.get());
        assert!(!hw.handles.red_led.get());
        assert!(hw.handles.yellow_led.get());

        io.set_green_led(false);
        io.set_red_led(true);
        let status = io.status();
        assert_eq!(
            status,
            OperatorStatus {
                button_a: false,
                green_led: false,
                red_led: true,
                yellow_led: true,
            }
        );
    }
}
