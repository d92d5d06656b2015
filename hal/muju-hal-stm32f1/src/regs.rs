//! Peripheral access layer
//!
//! [`Stm32f1Registers`] lists the port, AFIO and EXTI operations the
//! backend needs. [`Stm32f1Pac`] implements it with the `stm32f1` device
//! crate; tests substitute a model of the hardware.

use muju_hal::{Edges, InterruptLines};

/// NVIC numbers of the EXTI vectors
pub mod irq {
    pub const EXTI0: u16 = 6;
    pub const EXTI9_5: u16 = 23;
    pub const EXTI15_10: u16 = 40;
}

/// NVIC priority bits implemented by the Cortex-M3 core of the STM32F1
pub const NVIC_PRIO_BITS: u8 = 4;

/// Number of GPIO ports on the LQFP48 package (A-D)
pub const PORTS: u8 = 4;

/// Four-bit `CNF`:`MODE` nibble of a pin in `CRL`/`CRH`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortMode(u8);

impl PortMode {
    /// Input, no pull (the reset state)
    pub const INPUT_FLOATING: Self = Self(0x4);
    /// Input with pull-up or pull-down, chosen by the `ODR` bit
    pub const INPUT_PULL: Self = Self(0x8);
    /// General purpose push-pull output, 2 MHz
    pub const OUTPUT_2MHZ: Self = Self(0x2);
    /// Alternate function push-pull output, 2 MHz
    pub const ALTERNATE_2MHZ: Self = Self(0xA);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0xF)
    }

    /// `MODE` = 00
    pub const fn is_input(self) -> bool {
        self.0 & 0x3 == 0
    }
}

/// Peripheral operations the backend relies on
///
/// Ports are numbered from 0 for `GPIOA`; `mask` arguments have one bit
/// per pin. EXTI lines are 0-15.
pub trait Stm32f1Registers: InterruptLines {
    fn enable_port_clock(&mut self, port: u8);

    fn enable_afio_clock(&mut self);

    /// Program the `CNF`:`MODE` nibble of `port`.`pin`
    fn configure(&mut self, port: u8, pin: u8, mode: PortMode);

    fn mode(&self, port: u8, pin: u8) -> PortMode;

    /// `IDR` of `port`
    fn read_input(&self, port: u8) -> u16;

    /// `ODR` of `port`
    fn read_output(&self, port: u8) -> u16;

    /// Drive the pins of `mask` high (`BSRR`)
    fn set_bits(&mut self, port: u8, mask: u16);

    /// Drive the pins of `mask` low (`BRR`)
    fn reset_bits(&mut self, port: u8, mask: u16);

    /// Make `port` the source of EXTI `line`
    fn select_exti_port(&mut self, line: usize, port: u8);

    /// Unmask `line` as an interrupt; the event mask stays clear
    fn set_line_enabled(&mut self, line: usize, enabled: bool);

    /// Trigger `line` on exactly `edges`
    fn set_triggers(&mut self, line: usize, edges: Edges);

    /// `PR`, one bit per line
    fn pending_lines(&self) -> u32;

    /// Acknowledge the lines of `mask`
    fn clear_pending_lines(&mut self, mask: u32);
}

#[cfg(feature = "mmio")]
pub use self::pac::Stm32f1Pac;

#[cfg(feature = "mmio")]
#[allow(unsafe_code)]
mod pac {
    use muju_hal::irq::Nvic;
    use muju_hal::{Edges, InterruptLines};
    use stm32f1::stm32f103 as device;
    use stm32f1::stm32f103::gpioa;

    use super::{PortMode, Stm32f1Registers, NVIC_PRIO_BITS};

    fn gpio(port: u8) -> Option<&'static gpioa::RegisterBlock> {
        let block = match port {
            0 => device::GPIOA::ptr(),
            1 => device::GPIOB::ptr(),
            2 => device::GPIOC::ptr(),
            3 => device::GPIOD::ptr(),
            _ => return None,
        };
        // SAFETY: device register block; only touched from the controller's
        // critical section
        Some(unsafe { &*block })
    }

    fn rcc() -> &'static device::rcc::RegisterBlock {
        // SAFETY: as above
        unsafe { &*device::RCC::ptr() }
    }

    fn afio() -> &'static device::afio::RegisterBlock {
        // SAFETY: as above
        unsafe { &*device::AFIO::ptr() }
    }

    fn exti() -> &'static device::exti::RegisterBlock {
        // SAFETY: as above
        unsafe { &*device::EXTI::ptr() }
    }

    /// `bits` with the `width`-bit field at `shift` replaced by `value`
    const fn replace(bits: u32, shift: u32, width: u32, value: u32) -> u32 {
        let mask = ((1 << width) - 1) << shift;
        (bits & !mask) | ((value << shift) & mask)
    }

    /// The on-chip peripherals, through the device crate
    #[derive(Debug, Default)]
    pub struct Stm32f1Pac {
        nvic: Nvic<NVIC_PRIO_BITS>,
    }

    impl Stm32f1Pac {
        pub const fn new() -> Self {
            Self { nvic: Nvic::new() }
        }
    }

    impl Stm32f1Registers for Stm32f1Pac {
        fn enable_port_clock(&mut self, port: u8) {
            rcc().apb2enr.modify(|_, w| match port {
                0 => w.iopaen().set_bit(),
                1 => w.iopben().set_bit(),
                2 => w.iopcen().set_bit(),
                3 => w.iopden().set_bit(),
                _ => w,
            });
        }

        fn enable_afio_clock(&mut self) {
            rcc().apb2enr.modify(|_, w| w.afioen().set_bit());
        }

        fn configure(&mut self, port: u8, pin: u8, mode: PortMode) {
            let Some(gpio) = gpio(port) else {
                return;
            };
            let shift = (pin as u32 % 8) * 4;
            let value = mode.bits() as u32;
            if pin < 8 {
                gpio.crl
                    .modify(|r, w| unsafe { w.bits(replace(r.bits(), shift, 4, value)) });
            } else {
                gpio.crh
                    .modify(|r, w| unsafe { w.bits(replace(r.bits(), shift, 4, value)) });
            }
        }

        fn mode(&self, port: u8, pin: u8) -> PortMode {
            let Some(gpio) = gpio(port) else {
                return PortMode::INPUT_FLOATING;
            };
            let bits = if pin < 8 {
                gpio.crl.read().bits()
            } else {
                gpio.crh.read().bits()
            };
            PortMode::from_bits((bits >> ((pin as u32 % 8) * 4)) as u8)
        }

        fn read_input(&self, port: u8) -> u16 {
            gpio(port).map_or(0, |gpio| gpio.idr.read().bits() as u16)
        }

        fn read_output(&self, port: u8) -> u16 {
            gpio(port).map_or(0, |gpio| gpio.odr.read().bits() as u16)
        }

        fn set_bits(&mut self, port: u8, mask: u16) {
            if let Some(gpio) = gpio(port) {
                gpio.bsrr.write(|w| unsafe { w.bits(mask as u32) });
            }
        }

        fn reset_bits(&mut self, port: u8, mask: u16) {
            if let Some(gpio) = gpio(port) {
                gpio.brr.write(|w| unsafe { w.bits(mask as u32) });
            }
        }

        fn select_exti_port(&mut self, line: usize, port: u8) {
            let shift = (line as u32 % 4) * 4;
            let port = port as u32;
            let afio = afio();
            match line / 4 {
                0 => afio
                    .exticr1
                    .modify(|r, w| unsafe { w.bits(replace(r.bits(), shift, 4, port)) }),
                1 => afio
                    .exticr2
                    .modify(|r, w| unsafe { w.bits(replace(r.bits(), shift, 4, port)) }),
                2 => afio
                    .exticr3
                    .modify(|r, w| unsafe { w.bits(replace(r.bits(), shift, 4, port)) }),
                3 => afio
                    .exticr4
                    .modify(|r, w| unsafe { w.bits(replace(r.bits(), shift, 4, port)) }),
                _ => {}
            }
        }

        fn set_line_enabled(&mut self, line: usize, enabled: bool) {
            let exti = exti();
            let shift = line as u32;
            exti.imr
                .modify(|r, w| unsafe { w.bits(replace(r.bits(), shift, 1, enabled as u32)) });
            exti.emr
                .modify(|r, w| unsafe { w.bits(replace(r.bits(), shift, 1, 0)) });
        }

        fn set_triggers(&mut self, line: usize, edges: Edges) {
            let exti = exti();
            let shift = line as u32;
            exti.rtsr.modify(|r, w| unsafe {
                w.bits(replace(r.bits(), shift, 1, edges.rising as u32))
            });
            exti.ftsr.modify(|r, w| unsafe {
                w.bits(replace(r.bits(), shift, 1, edges.falling as u32))
            });
        }

        fn pending_lines(&self) -> u32 {
            exti().pr.read().bits()
        }

        fn clear_pending_lines(&mut self, mask: u32) {
            exti().pr.write(|w| unsafe { w.bits(mask) });
        }
    }

    impl InterruptLines for Stm32f1Pac {
        fn clear_pending_irq(&mut self, irq: u16) {
            self.nvic.clear_pending_irq(irq);
        }

        fn set_irq_priority(&mut self, irq: u16, priority: u8) {
            self.nvic.set_irq_priority(irq, priority);
        }

        fn enable_irq(&mut self, irq: u16) {
            self.nvic.enable_irq(irq);
        }

        fn disable_irq(&mut self, irq: u16) {
            self.nvic.disable_irq(irq);
        }
    }
}
