//! Event-driven key counter
//!
//! Counts presses from the pin event instead of polling, so presses shorter
//! than the polling period are not lost.

use core::sync::atomic::{AtomicU32, Ordering};

use muju_hal::{EventContext, EventError, GpioBackend, GpioBit, GpioController};

/// Press counter shared with the event callback
#[derive(Debug, Default)]
pub struct KeyCounter {
    presses: AtomicU32,
}

impl KeyCounter {
    pub const fn new() -> Self {
        Self {
            presses: AtomicU32::new(0),
        }
    }

    /// Count falling edges of `key` (presses of an active-low key)
    ///
    /// # Errors
    /// When no interrupt channel can serve `key`.
    pub fn attach<B: GpioBackend, const N: usize>(
        &'static self,
        gpio: &GpioController<B, N>,
        key: Option<GpioBit<B::Mux>>,
    ) -> Result<(), EventError> {
        gpio.set_event_handler(key, Some(on_press::<B::Mux>), self, false, true)
    }

    /// Stop counting presses of `key`
    pub fn detach<B: GpioBackend, const N: usize>(
        &'static self,
        gpio: &GpioController<B, N>,
        key: Option<GpioBit<B::Mux>>,
    ) -> Result<(), EventError> {
        gpio.set_event_handler(key, None, self, false, false)
    }

    pub fn presses(&self) -> u32 {
        self.presses.load(Ordering::Relaxed)
    }
}

fn on_press<M>(_: GpioBit<M>, rising: bool, context: EventContext) {
    if rising {
        return;
    }
    if let Some(counter) = context.downcast_ref::<KeyCounter>() {
        counter.presses.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::posix::BOARD;
    use crate::testing::controller;
    use muju_hal_posix::keyboard;

    #[test]
    fn test_counts_presses() {
        static COUNTER: KeyCounter = KeyCounter::new();
        let gpio = controller();
        BOARD.setup(&gpio);
        COUNTER.attach(&gpio, BOARD.key4).unwrap();

        // Key 4 is typed as `4`: press, release, press
        keyboard::handle_line(&gpio, "444", None);
        assert_eq!(COUNTER.presses(), 2);

        COUNTER.detach(&gpio, BOARD.key4).unwrap();
        keyboard::handle_line(&gpio, "44", None);
        assert_eq!(COUNTER.presses(), 2);
        assert_eq!(gpio.occupancy(), 0);
    }

    #[test]
    fn test_missing_key() {
        static COUNTER: KeyCounter = KeyCounter::new();
        let gpio = controller();
        assert_eq!(COUNTER.attach(&gpio, None), Ok(()));
        assert_eq!(gpio.occupancy(), 0);
    }
}
