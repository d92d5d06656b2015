//! Peripheral access layer
//!
//! The backend talks to the SCU, the GPIO port block and the pin-interrupt
//! block (PINT) through [`Lpc43xxRegisters`], a trait of the few operations
//! it needs. [`Lpc43xxMmio`] implements it on the typed register blocks
//! declared here; tests substitute a model of the hardware.

use muju_hal::{Edges, InterruptLines, Pull};
use tock_registers::fields::FieldValue;
use tock_registers::{register_bitfields, LocalRegisterCopy};

use crate::pins::ScuPin;

register_bitfields![u32,
    /// SCU pin configuration (`SFSPn_m`)
    pub SFS [
        /// Function routed to the pin
        MODE OFFSET(0) NUMBITS(3) [],
        /// Enable pull-down
        EPD OFFSET(3) NUMBITS(1) [],
        /// Disable pull-up
        EPUN OFFSET(4) NUMBITS(1) [],
        /// Fast slew rate
        EHS OFFSET(5) NUMBITS(1) [],
        /// Input buffer enable
        EZI OFFSET(6) NUMBITS(1) [],
        /// Input glitch filter disable
        ZIF OFFSET(7) NUMBITS(1) []
    ]
];

pub const SCU_BASE: usize = 0x4008_6000;
pub const GPIO_PORT_BASE: usize = 0x400F_6000;
pub const PINT_BASE: usize = 0x4008_7000;

/// NVIC number of `PIN_INT0`; the other channels follow
pub const PIN_INT0_IRQ: u16 = 32;

/// NVIC priority bits implemented by the Cortex-M4 core of the LPC43xx
pub const NVIC_PRIO_BITS: u8 = 3;

/// SCU configuration of a chip pin
///
/// The input buffer is always enabled and the glitch filter disabled, so
/// every pin can be read back and reacts to fast edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScuMode {
    /// Function routed to the pin (0-7)
    pub function: u8,
    pub pull: Pull,
}

impl ScuMode {
    pub const fn new(function: u8, pull: Pull) -> Self {
        Self { function, pull }
    }

    /// Register value selecting this mode
    pub fn field(self) -> FieldValue<u32, SFS::Register> {
        let pulls = match self.pull {
            Pull::None => SFS::EPD::CLEAR + SFS::EPUN::SET,
            Pull::Up => SFS::EPD::CLEAR + SFS::EPUN::CLEAR,
            Pull::Down => SFS::EPD::SET + SFS::EPUN::SET,
            Pull::Both => SFS::EPD::SET + SFS::EPUN::CLEAR,
        };
        SFS::MODE.val(self.function as u32) + pulls + SFS::EZI::SET + SFS::ZIF::SET
    }

    pub fn bits(self) -> u32 {
        u32::from(self.field())
    }

    /// Mode held in a raw `SFSP` value
    pub fn from_bits(bits: u32) -> Self {
        let reg: LocalRegisterCopy<u32, SFS::Register> = LocalRegisterCopy::new(bits);
        Self {
            function: reg.read(SFS::MODE) as u8,
            pull: Pull::new(!reg.is_set(SFS::EPUN), reg.is_set(SFS::EPD)),
        }
    }
}

/// Peripheral operations the backend relies on
///
/// GPIO groups are the `n` of `GPIOn_m`; `mask` arguments have one bit per
/// terminal of the group. Channels are pin-interrupt channels 0-7.
pub trait Lpc43xxRegisters: InterruptLines {
    fn set_pin_mode(&mut self, pin: ScuPin, mode: ScuMode);

    fn pin_mode(&self, pin: ScuPin) -> ScuMode;

    /// Make the terminals of `mask` outputs (`true`) or inputs
    fn set_port_direction(&mut self, gpio: u8, mask: u32, output: bool);

    /// Levels of every terminal of group `gpio`
    fn read_port(&self, gpio: u8) -> u32;

    fn set_port_bits(&mut self, gpio: u8, mask: u32);

    fn clear_port_bits(&mut self, gpio: u8, mask: u32);

    fn toggle_port_bits(&mut self, gpio: u8, mask: u32);

    /// Route terminal `gpio`.`bit` to `channel`
    fn select_pin_interrupt(&mut self, channel: usize, gpio: u8, bit: u8);

    /// Make `channel` edge sensitive with exactly `edges` enabled
    fn set_edge_detection(&mut self, channel: usize, edges: Edges);

    /// Edges enabled on `channel`
    fn enabled_edges(&self, channel: usize) -> Edges;

    /// Edges latched on `channel` since they were last cleared
    ///
    /// The hardware latches both directions whatever is enabled.
    fn detected_edges(&self, channel: usize) -> Edges;

    /// Forget the edges latched on `channel`
    fn clear_detected_edges(&mut self, channel: usize);

    /// Channels with a pending interrupt, one bit each
    fn interrupt_status(&self) -> u32;

    /// Acknowledge the interrupt of `channel`
    fn clear_interrupt_status(&mut self, channel: usize);
}

#[cfg(feature = "mmio")]
pub use self::mmio::Lpc43xxMmio;

#[cfg(feature = "mmio")]
#[allow(unsafe_code)]
mod mmio {
    use muju_hal::irq::Nvic;
    use muju_hal::{Edges, InterruptLines};
    use tock_registers::interfaces::{Readable, Writeable};
    use tock_registers::register_structs;
    use tock_registers::registers::{ReadWrite, WriteOnly};

    use super::{
        Lpc43xxRegisters, ScuMode, GPIO_PORT_BASE, NVIC_PRIO_BITS, PINT_BASE, SCU_BASE, SFS,
    };
    use crate::pins::ScuPin;

    register_structs! {
        /// System Control Unit (pin multiplexer)
        pub ScuRegisters {
            (0x000 => sfsp: [[ReadWrite<u32, SFS::Register>; 32]; 16]),
            (0x800 => _reserved0),
            // Pin interrupt select, channels 0-3 and 4-7
            (0xE00 => pintsel: [ReadWrite<u32>; 2]),
            (0xE08 => @END),
        }
    }

    register_structs! {
        /// GPIO port block, word registers from `DIR` on
        pub GpioPortRegisters {
            (0x000 => dir: [ReadWrite<u32>; 8]),
            (0x020 => _reserved0),
            (0x100 => pin: [ReadWrite<u32>; 8]),
            (0x120 => _reserved1),
            (0x200 => set: [ReadWrite<u32>; 8]),
            (0x220 => _reserved2),
            (0x280 => clr: [WriteOnly<u32>; 8]),
            (0x2A0 => _reserved3),
            (0x300 => not: [WriteOnly<u32>; 8]),
            (0x320 => @END),
        }
    }

    register_structs! {
        /// GPIO pin interrupt block
        pub PintRegisters {
            // Mode: 0 edge, 1 level
            (0x00 => isel: ReadWrite<u32>),
            (0x04 => ienr: ReadWrite<u32>),
            (0x08 => sienr: WriteOnly<u32>),
            (0x0C => cienr: WriteOnly<u32>),
            (0x10 => ienf: ReadWrite<u32>),
            (0x14 => sienf: WriteOnly<u32>),
            (0x18 => cienf: WriteOnly<u32>),
            // Rising edge detected; write 1 to clear
            (0x1C => rise: ReadWrite<u32>),
            // Falling edge detected; write 1 to clear
            (0x20 => fall: ReadWrite<u32>),
            // Interrupt status; write 1 to clear
            (0x24 => ist: ReadWrite<u32>),
            (0x28 => @END),
        }
    }

    fn scu() -> &'static ScuRegisters {
        // SAFETY: fixed SCU address of the LPC43xx; only touched from the
        // controller's critical section
        unsafe { &*(SCU_BASE as *const ScuRegisters) }
    }

    fn port() -> &'static GpioPortRegisters {
        // SAFETY: as above, GPIO port block
        unsafe { &*(GPIO_PORT_BASE as *const GpioPortRegisters) }
    }

    fn pint() -> &'static PintRegisters {
        // SAFETY: as above, pin interrupt block
        unsafe { &*(PINT_BASE as *const PintRegisters) }
    }

    fn modify(reg: &ReadWrite<u32>, clear: u32, set: u32) {
        reg.set((reg.get() & !clear) | set);
    }

    /// The on-chip peripherals
    #[derive(Debug, Default)]
    pub struct Lpc43xxMmio {
        nvic: Nvic<NVIC_PRIO_BITS>,
    }

    impl Lpc43xxMmio {
        pub const fn new() -> Self {
            Self { nvic: Nvic::new() }
        }
    }

    impl Lpc43xxRegisters for Lpc43xxMmio {
        fn set_pin_mode(&mut self, pin: ScuPin, mode: ScuMode) {
            let group = scu().sfsp.get(pin.port as usize);
            if let Some(reg) = group.and_then(|group| group.get(pin.pin as usize)) {
                reg.write(mode.field());
            }
        }

        fn pin_mode(&self, pin: ScuPin) -> ScuMode {
            let group = scu().sfsp.get(pin.port as usize);
            group
                .and_then(|group| group.get(pin.pin as usize))
                .map(|reg| ScuMode::from_bits(reg.get()))
                .unwrap_or_default()
        }

        fn set_port_direction(&mut self, gpio: u8, mask: u32, output: bool) {
            if let Some(reg) = port().dir.get(gpio as usize) {
                if output {
                    modify(reg, 0, mask);
                } else {
                    modify(reg, mask, 0);
                }
            }
        }

        fn read_port(&self, gpio: u8) -> u32 {
            port().pin.get(gpio as usize).map_or(0, |reg| reg.get())
        }

        fn set_port_bits(&mut self, gpio: u8, mask: u32) {
            if let Some(reg) = port().set.get(gpio as usize) {
                reg.set(mask);
            }
        }

        fn clear_port_bits(&mut self, gpio: u8, mask: u32) {
            if let Some(reg) = port().clr.get(gpio as usize) {
                reg.set(mask);
            }
        }

        fn toggle_port_bits(&mut self, gpio: u8, mask: u32) {
            if let Some(reg) = port().not.get(gpio as usize) {
                reg.set(mask);
            }
        }

        fn select_pin_interrupt(&mut self, channel: usize, gpio: u8, bit: u8) {
            let shift = (channel % 4) * 8;
            let source = ((gpio as u32) << 5) | bit as u32;
            if let Some(reg) = scu().pintsel.get(channel / 4) {
                modify(reg, 0xFF << shift, source << shift);
            }
        }

        fn set_edge_detection(&mut self, channel: usize, edges: Edges) {
            let line = 1 << channel;
            let pint = pint();
            modify(&pint.isel, line, 0);
            if edges.rising {
                pint.sienr.set(line);
            } else {
                pint.cienr.set(line);
            }
            if edges.falling {
                pint.sienf.set(line);
            } else {
                pint.cienf.set(line);
            }
        }

        fn enabled_edges(&self, channel: usize) -> Edges {
            let pint = pint();
            Edges::new(
                pint.ienr.get() & (1 << channel) != 0,
                pint.ienf.get() & (1 << channel) != 0,
            )
        }

        fn detected_edges(&self, channel: usize) -> Edges {
            let pint = pint();
            Edges::new(
                pint.rise.get() & (1 << channel) != 0,
                pint.fall.get() & (1 << channel) != 0,
            )
        }

        fn clear_detected_edges(&mut self, channel: usize) {
            let pint = pint();
            pint.rise.set(1 << channel);
            pint.fall.set(1 << channel);
        }

        fn interrupt_status(&self) -> u32 {
            pint().ist.get()
        }

        fn clear_interrupt_status(&mut self, channel: usize) {
            pint().ist.set(1 << channel);
        }
    }

    impl InterruptLines for Lpc43xxMmio {
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
