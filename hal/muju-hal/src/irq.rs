//! Interrupt controller access
//!
//! Backends arm channels by enabling the vector that serves them. The
//! operations they need are collected here so the silicon crates share a
//! single NVIC implementation and tests can record the calls instead.

/// Interrupt lines of the core interrupt controller
pub trait InterruptLines {
    /// Forget a request latched on `irq`
    fn clear_pending_irq(&mut self, irq: u16);

    /// Set the priority of `irq` (0 is the most urgent)
    fn set_irq_priority(&mut self, irq: u16, priority: u8);

    /// Let `irq` reach the processor
    fn enable_irq(&mut self, irq: u16);

    /// Block `irq`
    fn disable_irq(&mut self, irq: u16);
}

#[cfg(feature = "cortex-m")]
pub use self::nvic::Nvic;

#[cfg(feature = "cortex-m")]
#[allow(unsafe_code)]
mod nvic {
    use cortex_m::interrupt::InterruptNumber;
    use cortex_m::peripheral::NVIC;

    use super::InterruptLines;

    #[derive(Clone, Copy)]
    struct Irq(u16);

    // SAFETY: the backends only pass device interrupt numbers taken from
    // their reference manual vector tables.
    unsafe impl InterruptNumber for Irq {
        fn number(self) -> u16 {
            self.0
        }
    }

    /// Cortex-M NVIC with `PRIO_BITS` implemented priority bits
    #[derive(Debug, Default, Clone, Copy)]
    pub struct Nvic<const PRIO_BITS: u8>;

    impl<const PRIO_BITS: u8> Nvic<PRIO_BITS> {
        pub const fn new() -> Self {
            Self
        }
    }

    impl<const PRIO_BITS: u8> InterruptLines for Nvic<PRIO_BITS> {
        fn clear_pending_irq(&mut self, irq: u16) {
            NVIC::unpend(Irq(irq));
        }

        fn set_irq_priority(&mut self, irq: u16, priority: u8) {
            let max = (1u16 << PRIO_BITS) - 1;
            let level = (priority as u16).min(max) as u8;
            // SAFETY: the NVIC is only reconfigured from the controller's
            // critical section; changing a priority cannot break other
            // priority-based critical sections in this HAL.
            unsafe {
                let mut peripherals = cortex_m::Peripherals::steal();
                peripherals
                    .NVIC
                    .set_priority(Irq(irq), level << (8 - PRIO_BITS));
            }
        }

        fn enable_irq(&mut self, irq: u16) {
            // SAFETY: the controller installs the binding before the line is
            // unmasked, so the handler always finds consistent state.
            unsafe { NVIC::unmask(Irq(irq)) }
        }

        fn disable_irq(&mut self, irq: u16) {
            NVIC::mask(Irq(irq));
        }
    }
}
