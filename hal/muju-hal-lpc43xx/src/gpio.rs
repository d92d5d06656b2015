//! GPIO and pin-interrupt glue
//!
//! The PINT block has eight channels. `PINTSEL` can route any GPIO
//! terminal to any channel, so channels are handed out first-free and each
//! one has its own NVIC vector (`PIN_INT0`..`PIN_INT7`).

use muju_hal::gpio::{Edges, GpioBackend, GpioBit};
use muju_hal::{ChipPins, GpioController, Pull};

use crate::pins::{ScuMux, ScuPin};
use crate::regs::{Lpc43xxRegisters, ScuMode, PIN_INT0_IRQ};

/// Number of pin-interrupt channels
pub const CHANNELS: usize = 8;

/// Controller for an LPC43xx with register layer `R`
pub type Controller<R> = GpioController<Lpc43xx<R>, CHANNELS>;

/// LPC43xx backend
pub struct Lpc43xx<R> {
    regs: R,
}

impl<R> Lpc43xx<R> {
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Register layer
    pub fn registers(&self) -> &R {
        &self.regs
    }

    /// Register layer, mutably
    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }
}

/// NVIC number serving `channel`
pub const fn irq_of(channel: usize) -> u16 {
    PIN_INT0_IRQ + channel as u16
}

const fn mask(bit: u8) -> u32 {
    1 << bit
}

impl<R: Lpc43xxRegisters> GpioBackend for Lpc43xx<R> {
    type Mux = ScuMux;

    fn set_direction(&mut self, pin: GpioBit<ScuMux>, output: bool) {
        // Inputs keep the pull-up so open keys read high
        let pull = if output { Pull::None } else { Pull::Up };
        let mux = pin.mux();
        self.regs
            .set_pin_mode(mux.scu_pin(), ScuMode::new(mux.function, pull));
        self.regs
            .set_port_direction(pin.gpio(), mask(pin.bit()), output);
    }

    fn get_state(&self, pin: GpioBit<ScuMux>) -> bool {
        self.regs.read_port(pin.gpio()) & mask(pin.bit()) != 0
    }

    fn set_state(&mut self, pin: GpioBit<ScuMux>, state: bool) {
        if state {
            self.regs.set_port_bits(pin.gpio(), mask(pin.bit()));
        } else {
            self.regs.clear_port_bits(pin.gpio(), mask(pin.bit()));
        }
    }

    fn toggle(&mut self, pin: GpioBit<ScuMux>) {
        self.regs.toggle_port_bits(pin.gpio(), mask(pin.bit()));
    }

    fn arm(&mut self, channel: usize, pin: GpioBit<ScuMux>, edges: Edges, priority: u8) {
        self.regs
            .select_pin_interrupt(channel, pin.gpio(), pin.bit());
        // Edges seen before arming belong to whatever was routed here before
        self.regs.clear_detected_edges(channel);
        self.regs.set_edge_detection(channel, edges);
        self.regs.clear_interrupt_status(channel);

        let irq = irq_of(channel);
        self.regs.clear_pending_irq(irq);
        self.regs.set_irq_priority(irq, priority);
        self.regs.enable_irq(irq);
    }

    fn disarm(&mut self, channel: usize, _pin: GpioBit<ScuMux>) {
        self.regs.set_edge_detection(channel, Edges::NONE);
        self.regs.clear_interrupt_status(channel);

        // Each channel has its own vector
        let irq = irq_of(channel);
        self.regs.disable_irq(irq);
        self.regs.clear_pending_irq(irq);
    }

    fn is_pending(&self, channel: usize) -> bool {
        self.regs.interrupt_status() & (1 << channel) != 0
    }

    fn rising_edge(&self, channel: usize, pin: GpioBit<ScuMux>) -> bool {
        // RISE and FALL latch every edge, enabled or not
        let enabled = self.regs.enabled_edges(channel);
        let detected = self.regs.detected_edges(channel);
        match (
            enabled.rising && detected.rising,
            enabled.falling && detected.falling,
        ) {
            (true, false) => true,
            (false, true) => false,
            // Both edges since the last service: the level tells the latest
            _ => self.get_state(pin),
        }
    }

    fn clear_pending(&mut self, channel: usize) {
        self.regs.clear_interrupt_status(channel);
    }
}

impl<R: Lpc43xxRegisters> ChipPins for Lpc43xx<R> {
    type ChipPin = ScuPin;

    fn set_function(&mut self, pin: ScuPin, function: u8, pull: Pull) {
        self.regs.set_pin_mode(pin, ScuMode::new(function, pull));
    }

    fn pull(&self, pin: ScuPin) -> Pull {
        self.regs.pin_mode(pin).pull
    }

    fn set_pull(&mut self, pin: ScuPin, pull: Pull) {
        let mode = self.regs.pin_mode(pin);
        self.regs.set_pin_mode(pin, ScuMode { pull, ..mode });
    }
}

/// Service `PIN_INT<channel>`
///
/// Bind each vector to this, e.g. `on_pin_int(&GPIO, 3)` from `PIN_INT3`.
pub fn on_pin_int<R: Lpc43xxRegisters>(controller: &Controller<R>, channel: usize) -> bool {
    controller.dispatch(channel)
}
