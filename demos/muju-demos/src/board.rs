//! Board resources used by the demos
//!
//! Every resource is optional. A board without, say, an RGB led leaves those
//! fields `None` and the demos run unchanged: operations on a missing pin do
//! nothing.

use muju_hal::{GpioBackend, GpioBit, GpioController};

/// Three outputs of an RGB led
pub struct RgbLed<M: 'static> {
    pub red: Option<GpioBit<M>>,
    pub green: Option<GpioBit<M>>,
    pub blue: Option<GpioBit<M>>,
}

impl<M> Clone for RgbLed<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for RgbLed<M> {}

/// Leds and keys of a teaching board
///
/// Keys are active-low: pressed reads `false`.
pub struct Board<M: 'static> {
    pub rgb: RgbLed<M>,
    pub led1: Option<GpioBit<M>>,
    pub led2: Option<GpioBit<M>>,
    pub led3: Option<GpioBit<M>>,
    pub key1: Option<GpioBit<M>>,
    pub key2: Option<GpioBit<M>>,
    pub key3: Option<GpioBit<M>>,
    pub key4: Option<GpioBit<M>>,
}

impl<M> Clone for Board<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for Board<M> {}

impl<M: Sync + 'static> Board<M> {
    /// Board with no resources at all
    pub const fn empty() -> Self {
        Self {
            rgb: RgbLed {
                red: None,
                green: None,
                blue: None,
            },
            led1: None,
            led2: None,
            led3: None,
            key1: None,
            key2: None,
            key3: None,
            key4: None,
        }
    }

    /// Leds as outputs, keys as inputs
    pub fn setup<B, const N: usize>(&self, gpio: &GpioController<B, N>)
    where
        B: GpioBackend<Mux = M>,
    {
        for led in self.leds() {
            gpio.set_direction(led, true);
        }
        for key in self.keys() {
            gpio.set_direction(key, false);
        }
    }

    /// Every output, RGB channels first
    pub fn leds(&self) -> [Option<GpioBit<M>>; 6] {
        [
            self.rgb.red,
            self.rgb.green,
            self.rgb.blue,
            self.led1,
            self.led2,
            self.led3,
        ]
    }

    pub fn keys(&self) -> [Option<GpioBit<M>>; 4] {
        [self.key1, self.key2, self.key3, self.key4]
    }
}

/// EDU-CIAA-NXP (LPC4337)
pub mod edu_ciaa_nxp {
    use muju_hal_lpc43xx::pins::*;
    use muju_hal_lpc43xx::ScuMux;

    use super::{Board, RgbLed};

    pub static BOARD: Board<ScuMux> = Board {
        rgb: RgbLed {
            red: Some(&GPIO5_0),
            green: Some(&GPIO5_1),
            blue: Some(&GPIO5_2),
        },
        led1: Some(&GPIO0_14),
        led2: Some(&GPIO1_11),
        led3: Some(&GPIO1_12),
        key1: Some(&GPIO0_4),
        key2: Some(&GPIO0_8),
        key3: Some(&GPIO0_9),
        key4: Some(&GPIO1_9),
    };
}

/// Blue Pill (STM32F103C8)
///
/// Only the on-board led on PC13 is populated.
pub mod blue_pill {
    use muju_hal_stm32f1::pins::PC13;
    use muju_hal_stm32f1::ChipPin;

    use super::Board;

    pub static BOARD: Board<ChipPin> = Board {
        led1: Some(&PC13),
        ..Board::empty()
    };
}

/// POSIX simulator
///
/// RGB led and leds on GPIO3, keys on GPIO0 bits 0-3 (typed as `1`-`4`).
pub mod posix {
    use muju_hal_posix::pins::*;

    use super::{Board, RgbLed};

    pub static BOARD: Board<()> = Board {
        rgb: RgbLed {
            red: Some(&GPIO3_7),
            green: Some(&GPIO3_6),
            blue: Some(&GPIO3_5),
        },
        led1: Some(&GPIO3_2),
        led2: Some(&GPIO3_1),
        led3: Some(&GPIO3_0),
        key1: Some(&GPIO0_0),
        key2: Some(&GPIO0_1),
        key3: Some(&GPIO0_2),
        key4: Some(&GPIO0_3),
    };
}
