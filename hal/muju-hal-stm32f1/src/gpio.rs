//! GPIO and EXTI glue
//!
//! EXTI line `n` can only watch pin `n` of one port (selected in AFIO), so
//! a pin's channel is fixed by its number. Lines 0-4 have their own
//! vectors; 5-9 and 10-15 share one vector each.

use core::ops::Range;

use muju_hal::gpio::{ChannelPolicy, Edges, GpioBackend, GpioBit};
use muju_hal::{ChipPins, GpioController, Pull};

use crate::pins::ChipPin;
use crate::regs::{irq, PortMode, Stm32f1Registers};

/// Number of EXTI lines
pub const CHANNELS: usize = 16;

/// Controller for an STM32F1 with register layer `R`
pub type Controller<R> = GpioController<Stm32f1<R>, CHANNELS>;

/// STM32F1xx backend
pub struct Stm32f1<R> {
    regs: R,
    /// Lines with an enabled handler, used to share grouped vectors
    armed: u16,
}

impl<R> Stm32f1<R> {
    pub const fn new(regs: R) -> Self {
        Self { regs, armed: 0 }
    }

    pub fn registers(&self) -> &R {
        &self.regs
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.regs
    }
}

/// NVIC number serving EXTI `line`
pub const fn irq_of(line: usize) -> u16 {
    match line {
        0..=4 => irq::EXTI0 + line as u16,
        5..=9 => irq::EXTI9_5,
        _ => irq::EXTI15_10,
    }
}

/// Lines served by the same vector as `line`
const fn vector_group(line: usize) -> u16 {
    match line {
        0..=4 => 1 << line,
        5..=9 => 0x03E0,
        _ => 0xFC00,
    }
}

impl<R: Stm32f1Registers> Stm32f1<R> {
    /// Input mode for `pull`, selecting the pull direction through `ODR`
    fn configure_input(&mut self, ChipPin { port, pin }: ChipPin, pull: Pull) {
        self.regs.enable_port_clock(port);
        if pull == Pull::None {
            self.regs.configure(port, pin, PortMode::INPUT_FLOATING);
            return;
        }
        self.regs.configure(port, pin, PortMode::INPUT_PULL);
        // One resistor per pin; the pull-up wins when both are asked for
        if pull.up() {
            self.regs.set_bits(port, 1 << pin);
        } else {
            self.regs.reset_bits(port, 1 << pin);
        }
    }
}

impl<R: Stm32f1Registers> GpioBackend for Stm32f1<R> {
    type Mux = ChipPin;

    fn set_direction(&mut self, pin: GpioBit<ChipPin>, output: bool) {
        let chip = *pin.mux();
        if output {
            self.regs.enable_port_clock(chip.port);
            self.regs.configure(chip.port, chip.pin, PortMode::OUTPUT_2MHZ);
        } else {
            self.configure_input(chip, Pull::Up);
        }
    }

    fn get_state(&self, pin: GpioBit<ChipPin>) -> bool {
        let ChipPin { port, pin } = *pin.mux();
        self.regs.read_input(port) & (1 << pin) != 0
    }

    fn set_state(&mut self, pin: GpioBit<ChipPin>, state: bool) {
        let ChipPin { port, pin } = *pin.mux();
        if state {
            self.regs.set_bits(port, 1 << pin);
        } else {
            self.regs.reset_bits(port, 1 << pin);
        }
    }

    fn toggle(&mut self, pin: GpioBit<ChipPin>) {
        let ChipPin { port, pin } = *pin.mux();
        if self.regs.read_output(port) & (1 << pin) != 0 {
            self.regs.reset_bits(port, 1 << pin);
        } else {
            self.regs.set_bits(port, 1 << pin);
        }
    }

    fn channel_policy(&self, pin: GpioBit<ChipPin>) -> ChannelPolicy {
        ChannelPolicy::Fixed(pin.mux().pin as usize)
    }

    fn arm(&mut self, channel: usize, pin: GpioBit<ChipPin>, edges: Edges, priority: u8) {
        self.regs.enable_afio_clock();
        self.regs.select_exti_port(channel, pin.mux().port);
        self.regs.set_line_enabled(channel, true);
        self.regs.set_triggers(channel, edges);
        self.regs.clear_pending_lines(1 << channel);

        let irq = irq_of(channel);
        self.regs.clear_pending_irq(irq);
        self.regs.set_irq_priority(irq, priority);
        self.regs.enable_irq(irq);
        self.armed |= 1 << channel;
    }

    fn disarm(&mut self, channel: usize, _pin: GpioBit<ChipPin>) {
        self.regs.set_line_enabled(channel, false);
        self.regs.set_triggers(channel, Edges::NONE);
        self.regs.clear_pending_lines(1 << channel);
        self.armed &= !(1 << channel);

        let irq = irq_of(channel);
        if self.armed & vector_group(channel) == 0 {
            self.regs.disable_irq(irq);
        }
        self.regs.clear_pending_irq(irq);
    }

    fn is_pending(&self, channel: usize) -> bool {
        self.regs.pending_lines() & (1 << channel) != 0
    }

    fn rising_edge(&self, _channel: usize, pin: GpioBit<ChipPin>) -> bool {
        // No edge status register: a high level after the event means it rose
        self.get_state(pin)
    }

    fn clear_pending(&mut self, channel: usize) {
        self.regs.clear_pending_lines(1 << channel);
    }
}

/// Function 0 is the GPIO input; any other number hands the pin to its
/// peripheral as an alternate function output.
impl<R: Stm32f1Registers> ChipPins for Stm32f1<R> {
    type ChipPin = ChipPin;

    fn set_function(&mut self, pin: ChipPin, function: u8, pull: Pull) {
        if function == 0 {
            self.configure_input(pin, pull);
        } else {
            self.regs.enable_port_clock(pin.port);
            self.regs.configure(pin.port, pin.pin, PortMode::ALTERNATE_2MHZ);
        }
    }

    fn pull(&self, ChipPin { port, pin }: ChipPin) -> Pull {
        if self.regs.mode(port, pin) != PortMode::INPUT_PULL {
            Pull::None
        } else if self.regs.read_output(port) & (1 << pin) != 0 {
            Pull::Up
        } else {
            Pull::Down
        }
    }

    fn set_pull(&mut self, pin: ChipPin, pull: Pull) {
        // Outputs have no pull resistors
        if self.regs.mode(pin.port, pin.pin).is_input() {
            self.configure_input(pin, pull);
        }
    }
}

const EXTI9_5_LINES: Range<usize> = 5..10;
const EXTI15_10_LINES: Range<usize> = 10..16;

pub fn on_exti0<R: Stm32f1Registers>(controller: &Controller<R>) -> bool {
    controller.dispatch(0)
}

pub fn on_exti1<R: Stm32f1Registers>(controller: &Controller<R>) -> bool {
    controller.dispatch(1)
}

pub fn on_exti2<R: Stm32f1Registers>(controller: &Controller<R>) -> bool {
    controller.dispatch(2)
}

pub fn on_exti3<R: Stm32f1Registers>(controller: &Controller<R>) -> bool {
    controller.dispatch(3)
}

pub fn on_exti4<R: Stm32f1Registers>(controller: &Controller<R>) -> bool {
    controller.dispatch(4)
}

/// Service every pending line of 5-9, lowest first
pub fn on_exti9_5<R: Stm32f1Registers>(controller: &Controller<R>) -> usize {
    controller.dispatch_pending(EXTI9_5_LINES)
}

/// Service every pending line of 10-15, lowest first
pub fn on_exti15_10<R: Stm32f1Registers>(controller: &Controller<R>) -> usize {
    controller.dispatch_pending(EXTI15_10_LINES)
}
