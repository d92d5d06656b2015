//! RGB led sequencer

use muju_hal::gpio::same_pin;
use muju_hal::sci::{SciError, SerialPort};
use muju_hal::{GpioBackend, GpioController};

use crate::board::RgbLed;

/// Step of the sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RgbStep {
    RedOn,
    RedOff,
    GreenOn,
    GreenOff,
    BlueOn,
    BlueOff,
}

impl RgbStep {
    pub const fn next(self) -> Self {
        match self {
            RgbStep::RedOn => RgbStep::RedOff,
            RgbStep::RedOff => RgbStep::GreenOn,
            RgbStep::GreenOn => RgbStep::GreenOff,
            RgbStep::GreenOff => RgbStep::BlueOn,
            RgbStep::BlueOn => RgbStep::BlueOff,
            RgbStep::BlueOff => RgbStep::RedOn,
        }
    }

    /// Console line announcing this step
    pub const fn message(self) -> &'static str {
        match self {
            RgbStep::RedOn => "RED Channel of RGB led is on\n",
            RgbStep::GreenOn => "GREEN Channel of RGB led is on\n",
            RgbStep::BlueOn => "BLUE Channel of RGB led is on\n",
            _ => "All Channels of RGB led are off\n",
        }
    }
}

/// Lights red, green and blue in turn with a dark step between each
///
/// Advances one step every `divisor` ticks.
#[derive(Debug)]
pub struct RgbSequencer {
    step: RgbStep,
    count: u32,
    divisor: u32,
}

impl RgbSequencer {
    /// Start dark; the first step shown is red
    pub const fn new(divisor: u32) -> Self {
        Self {
            step: RgbStep::BlueOff,
            count: 0,
            divisor,
        }
    }

    pub fn step(&self) -> RgbStep {
        self.step
    }

    /// Count one tick, moving to the next step when the divisor is reached
    ///
    /// Returns the step entered, if any.
    pub fn tick<B, const N: usize>(
        &mut self,
        gpio: &GpioController<B, N>,
        led: &RgbLed<B::Mux>,
        console: &mut impl SerialPort,
    ) -> Result<Option<RgbStep>, SciError>
    where
        B: GpioBackend,
    {
        self.count += 1;
        if self.count < self.divisor {
            return Ok(None);
        }
        self.count = 0;
        self.step = self.step.next();

        let lit = match self.step {
            RgbStep::RedOn => led.red,
            RgbStep::GreenOn => led.green,
            RgbStep::BlueOn => led.blue,
            _ => None,
        };
        for channel in [led.red, led.green, led.blue] {
            let is_lit = matches!((channel, lit), (Some(a), Some(b)) if same_pin(a, b));
            if !is_lit {
                gpio.clear(channel);
            }
        }
        gpio.set(lit);

        console.send_all(self.step.message().as_bytes())?;
        Ok(Some(self.step))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::posix::BOARD;
    use crate::testing::{controller, Capture};

    #[test]
    fn test_cycle() {
        let gpio = controller();
        BOARD.setup(&gpio);
        let mut console = Capture::default();
        let mut rgb = RgbSequencer::new(3);

        let mut entered = Vec::new();
        for _ in 0..18 {
            if let Some(step) = rgb.tick(&gpio, &BOARD.rgb, &mut console).unwrap() {
                entered.push(step);
            }
        }
        assert_eq!(
            entered,
            [
                RgbStep::RedOn,
                RgbStep::RedOff,
                RgbStep::GreenOn,
                RgbStep::GreenOff,
                RgbStep::BlueOn,
                RgbStep::BlueOff
            ]
        );
        assert_eq!(
            console.text(),
            "RED Channel of RGB led is on\n\
             All Channels of RGB led are off\n\
             GREEN Channel of RGB led is on\n\
             All Channels of RGB led are off\n\
             BLUE Channel of RGB led is on\n\
             All Channels of RGB led are off\n"
        );
    }

    #[test]
    fn test_one_channel_at_a_time() {
        let gpio = controller();
        BOARD.setup(&gpio);
        let mut console = Capture::default();
        let mut rgb = RgbSequencer::new(1);
        let led = BOARD.rgb;

        rgb.tick(&gpio, &led, &mut console).unwrap();
        assert!(gpio.get_state(led.red));
        assert!(!gpio.get_state(led.green));

        rgb.tick(&gpio, &led, &mut console).unwrap();
        rgb.tick(&gpio, &led, &mut console).unwrap();
        assert!(!gpio.get_state(led.red));
        assert!(gpio.get_state(led.green));
        assert!(!gpio.get_state(led.blue));

        rgb.tick(&gpio, &led, &mut console).unwrap();
        assert_eq!(rgb.step(), RgbStep::GreenOff);
        assert!(led_states(&gpio, &led).iter().all(|on| !on));
    }

    #[test]
    fn test_missing_led_still_reports() {
        let gpio = controller();
        let mut console = Capture::default();
        let mut rgb = RgbSequencer::new(1);
        let none = RgbLed {
            red: None,
            green: None,
            blue: None,
        };

        assert_eq!(
            rgb.tick(&gpio, &none, &mut console),
            Ok(Some(RgbStep::RedOn))
        );
        assert_eq!(console.text(), "RED Channel of RGB led is on\n");
        assert_eq!(gpio.with_backend(|b| b.ports()), [0; 4]);
    }

    fn led_states(gpio: &muju_hal_posix::Controller, led: &RgbLed<()>) -> [bool; 3] {
        [
            gpio.get_state(led.red),
            gpio.get_state(led.green),
            gpio.get_state(led.blue),
        ]
    }
}
