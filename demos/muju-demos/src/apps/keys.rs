//! Polled key behaviours
//!
//! Keys are active-low, so a pressed key reads `false`.

use muju_hal::{GpioBackend, GpioBit, GpioController};

type Pin<B> = Option<GpioBit<<B as GpioBackend>::Mux>>;

fn pressed<B: GpioBackend, const N: usize>(gpio: &GpioController<B, N>, key: Pin<B>) -> bool {
    key.is_some() && !gpio.get_state(key)
}

/// Turn `led` on while `key_on` is held and off while `key_off` is held
///
/// With both held, off wins.
pub fn switch_led<B: GpioBackend, const N: usize>(
    gpio: &GpioController<B, N>,
    key_on: Pin<B>,
    key_off: Pin<B>,
    led: Pin<B>,
) {
    if pressed(gpio, key_on) {
        gpio.set(led);
    }
    if pressed(gpio, key_off) {
        gpio.clear(led);
    }
}

/// Toggle a led once per key press
#[derive(Debug, Default)]
pub struct KeyToggle {
    was_pressed: bool,
}

impl KeyToggle {
    pub const fn new() -> Self {
        Self { was_pressed: false }
    }

    /// Sample `key`; toggles `led` and returns `true` on a new press
    pub fn poll<B: GpioBackend, const N: usize>(
        &mut self,
        gpio: &GpioController<B, N>,
        key: Pin<B>,
        led: Pin<B>,
    ) -> bool {
        let now = pressed(gpio, key);
        let edge = now && !self.was_pressed;
        self.was_pressed = now;
        if edge {
            gpio.toggle(led);
        }
        edge
    }
}

/// Light `led` exactly while `key` is held
pub fn follow_key<B: GpioBackend, const N: usize>(
    gpio: &GpioController<B, N>,
    key: Pin<B>,
    led: Pin<B>,
) {
    gpio.set_state(led, pressed(gpio, key));
}
