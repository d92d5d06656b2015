//! System tick abstraction
//!
//! A tick source calls a user function at a fixed period. The installed
//! handler is kept in a [`TickDispatcher`] so the exception handler (or
//! timer thread) can find it without a global per backend.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::events::EventContext;

/// Function called on every tick with the context given at start
pub type TickCallback = fn(EventContext);

/// Periodic timer
pub trait SystemTick {
    /// Start calling `callback` every `period_us` microseconds
    fn start(&mut self, callback: TickCallback, context: EventContext, period_us: u32);
}

/// Holder for the installed tick handler
pub struct TickDispatcher {
    handler: Mutex<CriticalSectionRawMutex, Cell<Option<(TickCallback, EventContext)>>>,
}

impl Default for TickDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TickDispatcher {
    /// Create a dispatcher with no handler
    pub const fn new() -> Self {
        Self {
            handler: Mutex::new(Cell::new(None)),
        }
    }

    /// Replace the handler
    pub fn install(&self, callback: TickCallback, context: EventContext) {
        self.handler.lock(|h| h.set(Some((callback, context))));
    }

    /// Remove the handler; later ticks do nothing
    pub fn remove(&self) {
        self.handler.lock(|h| h.set(None));
    }

    /// Run the handler, if any
    ///
    /// Call from the tick interrupt or timer thread. Returns `true` if a
    /// handler ran.
    pub fn fire(&self) -> bool {
        // Copy out first so the handler runs outside the critical section
        let handler = self.handler.lock(Cell::get);
        match handler {
            Some((callback, context)) => {
                callback(context);
                true
            }
            None => false,
        }
    }
}

#[cfg(feature = "cortex-m")]
pub use self::systick::SysTickTimer;

#[cfg(feature = "cortex-m")]
#[allow(unsafe_code)]
mod systick {
    use cortex_m::peripheral::scb::SystemHandler;
    use cortex_m::peripheral::syst::SystClkSource;

    use super::{SystemTick, TickCallback, TickDispatcher};
    use crate::events::EventContext;

    /// SysTick-driven tick for Cortex-M parts
    ///
    /// Bind the `SysTick` exception to [`TickDispatcher::fire`] on the same
    /// dispatcher.
    pub struct SysTickTimer {
        dispatcher: &'static TickDispatcher,
        core_clock_hz: u32,
    }

    impl SysTickTimer {
        /// Create a timer clocked from the core clock
        pub const fn new(dispatcher: &'static TickDispatcher, core_clock_hz: u32) -> Self {
            Self {
                dispatcher,
                core_clock_hz,
            }
        }

        /// Reload value for a period, clamped to the 24-bit counter
        pub const fn reload(core_clock_hz: u32, period_us: u32) -> u32 {
            let ticks = (core_clock_hz / 1_000_000) as u64 * period_us as u64;
            let ticks = if ticks == 0 { 1 } else { ticks };
            let reload = ticks - 1;
            if reload > 0x00FF_FFFF {
                0x00FF_FFFF
            } else {
                reload as u32
            }
        }
    }

    impl SystemTick for SysTickTimer {
        fn start(&mut self, callback: TickCallback, context: EventContext, period_us: u32) {
            cortex_m::interrupt::free(|_| {
                self.dispatcher.install(callback, context);

                // SAFETY: SysTick and SCB are only reconfigured here, with
                // interrupts disabled.
                let mut peripherals = unsafe { cortex_m::Peripherals::steal() };
                let syst = &mut peripherals.SYST;
                syst.set_clock_source(SystClkSource::Core);
                syst.set_reload(Self::reload(self.core_clock_hz, period_us));
                syst.clear_current();
                syst.enable_interrupt();
                syst.enable_counter();

                // Lowest urgency so GPIO events preempt the tick
                unsafe {
                    peripherals.SCB.set_priority(SystemHandler::SysTick, 0xFF);
                }
            });
        }
    }

}
