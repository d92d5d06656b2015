//! Recording backend for host tests

use core::cell::Cell;

use heapless::Vec;

use crate::chip::{ChipPins, Pull};
use crate::gpio::{ChannelPolicy, Edges, GpioBackend, GpioBit};

/// Register write seen by [`MockBackend`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    SetDirection { gpio: u8, bit: u8, output: bool },
    SetState { gpio: u8, bit: u8, state: bool },
    Arm { channel: usize, gpio: u8, bit: u8, edges: Edges, priority: u8 },
    Disarm { channel: usize, gpio: u8, bit: u8 },
    ClearPending { channel: usize },
    SetFunction { pin: u8, function: u8, pull: Pull },
    SetPull { pin: u8, pull: Pull },
}

/// Backend that stores levels in memory and logs every access
///
/// With `FIXED` the channel of a pin is its bit number, like EXTI lines.
/// With `FILTER` the controller gates edges in software.
pub struct MockBackend<const FIXED: bool = false, const FILTER: bool = false> {
    calls: Vec<Call, 64>,
    reads: Cell<usize>,
    levels: [u32; 8],
    pending: u32,
    rising: u32,
    pulls: [Pull; 8],
}

impl<const FIXED: bool, const FILTER: bool> Default for MockBackend<FIXED, FILTER> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const FIXED: bool, const FILTER: bool> MockBackend<FIXED, FILTER> {
    pub const fn new() -> Self {
        Self {
            calls: Vec::new(),
            reads: Cell::new(0),
            levels: [0; 8],
            pending: 0,
            rising: 0,
            pulls: [Pull::None; 8],
        }
    }

    /// Latch an event on `channel`
    pub fn trigger(&mut self, channel: usize, rising: bool) {
        self.pending |= 1 << channel;
        if rising {
            self.rising |= 1 << channel;
        } else {
            self.rising &= !(1 << channel);
        }
    }

    /// Drive an input level from outside
    pub fn set_input(&mut self, pin: GpioBit<()>, level: bool) {
        let mask = 1 << pin.bit();
        if level {
            self.levels[pin.gpio() as usize] |= mask;
        } else {
            self.levels[pin.gpio() as usize] &= !mask;
        }
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    fn record(&mut self, call: Call) {
        let _ = self.calls.push(call);
    }

    fn read(&self) {
        self.reads.set(self.reads.get() + 1);
    }
}

impl<const FIXED: bool, const FILTER: bool> GpioBackend for MockBackend<FIXED, FILTER> {
    type Mux = ();

    const SOFTWARE_EDGE_FILTER: bool = FILTER;

    fn set_direction(&mut self, pin: GpioBit<()>, output: bool) {
        self.record(Call::SetDirection {
            gpio: pin.gpio(),
            bit: pin.bit(),
            output,
        });
    }

    fn get_state(&self, pin: GpioBit<()>) -> bool {
        self.read();
        self.levels[pin.gpio() as usize] & (1 << pin.bit()) != 0
    }

    fn set_state(&mut self, pin: GpioBit<()>, state: bool) {
        self.record(Call::SetState {
            gpio: pin.gpio(),
            bit: pin.bit(),
            state,
        });
        self.set_input(pin, state);
    }

    fn channel_policy(&self, pin: GpioBit<()>) -> ChannelPolicy {
        if FIXED {
            ChannelPolicy::Fixed(pin.bit() as usize)
        } else {
            ChannelPolicy::FirstFree
        }
    }

    fn arm(&mut self, channel: usize, pin: GpioBit<()>, edges: Edges, priority: u8) {
        self.record(Call::Arm {
            channel,
            gpio: pin.gpio(),
            bit: pin.bit(),
            edges,
            priority,
        });
        self.pending &= !(1 << channel);
    }

    fn disarm(&mut self, channel: usize, pin: GpioBit<()>) {
        self.record(Call::Disarm {
            channel,
            gpio: pin.gpio(),
            bit: pin.bit(),
        });
        self.pending &= !(1 << channel);
    }

    fn is_pending(&self, channel: usize) -> bool {
        self.read();
        self.pending & (1 << channel) != 0
    }

    fn rising_edge(&self, channel: usize, _pin: GpioBit<()>) -> bool {
        self.read();
        self.rising & (1 << channel) != 0
    }

    fn clear_pending(&mut self, channel: usize) {
        self.record(Call::ClearPending { channel });
        self.pending &= !(1 << channel);
    }
}

/// Chip pins are numbered 0-7
impl<const FIXED: bool, const FILTER: bool> ChipPins for MockBackend<FIXED, FILTER> {
    type ChipPin = u8;

    fn set_function(&mut self, pin: u8, function: u8, pull: Pull) {
        self.record(Call::SetFunction { pin, function, pull });
        self.pulls[pin as usize] = pull;
    }

    fn pull(&self, pin: u8) -> Pull {
        self.read();
        self.pulls[pin as usize]
    }

    fn set_pull(&mut self, pin: u8, pull: Pull) {
        self.record(Call::SetPull { pin, pull });
        self.pulls[pin as usize] = pull;
    }
}
