//! GPIO pin descriptors and backend abstraction
//!
//! A pin is identified by a `'static` [`PinDescriptor`] declared in the
//! backend's pin table. Descriptors are compared by address, so two
//! descriptors with the same numbers are still different pins unless they
//! are the same `static`.

use core::fmt;

/// Descriptor of one GPIO terminal
///
/// `M` is the silicon-specific payload needed to reconfigure the physical
/// pin (multiplexer function, physical port/pin) or `()` when the backend
/// has nothing extra to store.
pub struct PinDescriptor<M> {
    gpio: u8,
    bit: u8,
    mux: M,
}

impl<M> PinDescriptor<M> {
    /// Create a descriptor for bit `bit` of GPIO group `gpio`
    pub const fn new(gpio: u8, bit: u8, mux: M) -> Self {
        Self { gpio, bit, mux }
    }

    /// Logical GPIO group index
    pub const fn gpio(&self) -> u8 {
        self.gpio
    }

    /// Logical bit index within the group
    pub const fn bit(&self) -> u8 {
        self.bit
    }

    /// Backend multiplexing payload
    pub const fn mux(&self) -> &M {
        &self.mux
    }
}

impl<M: fmt::Debug> fmt::Debug for PinDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinDescriptor")
            .field("gpio", &self.gpio)
            .field("bit", &self.bit)
            .field("mux", &self.mux)
            .finish()
    }
}

/// Handle to a GPIO terminal, as passed around by application code
pub type GpioBit<M> = &'static PinDescriptor<M>;

/// Check whether two handles name the same terminal
#[inline]
pub fn same_pin<M>(a: GpioBit<M>, b: GpioBit<M>) -> bool {
    core::ptr::eq(a, b)
}

/// Edges that raise an event on an armed channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Edges {
    /// Low to high transition
    pub rising: bool,
    /// High to low transition
    pub falling: bool,
}

impl Edges {
    /// No edge enabled
    pub const NONE: Self = Self::new(false, false);
    /// Rising edge only
    pub const RISING: Self = Self::new(true, false);
    /// Falling edge only
    pub const FALLING: Self = Self::new(false, true);
    /// Both edges
    pub const BOTH: Self = Self::new(true, true);

    pub const fn new(rising: bool, falling: bool) -> Self {
        Self { rising, falling }
    }

    /// Check if at least one edge is enabled
    pub const fn any(self) -> bool {
        self.rising || self.falling
    }

    /// Check if an edge with the given polarity was requested
    pub const fn accepts(self, rising: bool) -> bool {
        if rising {
            self.rising
        } else {
            self.falling
        }
    }
}

/// How a backend maps a pin onto its interrupt channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelPolicy {
    /// Any channel can be routed to the pin; take the lowest free one
    FirstFree,
    /// The silicon wires the pin to exactly this channel
    Fixed(usize),
}

/// Register glue for one silicon family
///
/// Implementations translate descriptor operations into vendor register
/// accesses. They never see a null pin: the controller filters those out.
/// Channel indices passed in are always below the controller capacity and,
/// for `arm`/`disarm`, agree with [`GpioBackend::channel_policy`].
pub trait GpioBackend {
    /// Multiplexing payload carried by this backend's descriptors
    type Mux: Sync + 'static;

    /// Drop events whose polarity the slot did not request
    ///
    /// Backends whose trigger registers already filter edges leave this
    /// `false` and rely on [`GpioBackend::arm`] configuring the hardware.
    const SOFTWARE_EDGE_FILTER: bool = false;

    /// Reconfigure the multiplexer and direction register of `pin`
    fn set_direction(&mut self, pin: GpioBit<Self::Mux>, output: bool);

    /// Read the current logic level of `pin`
    fn get_state(&self, pin: GpioBit<Self::Mux>) -> bool;

    /// Drive `pin` to `state`
    fn set_state(&mut self, pin: GpioBit<Self::Mux>, state: bool);

    /// Invert the output level of `pin`
    fn toggle(&mut self, pin: GpioBit<Self::Mux>) {
        let state = self.get_state(pin);
        self.set_state(pin, !state);
    }

    /// Channel allocation rule for `pin`
    fn channel_policy(&self, _pin: GpioBit<Self::Mux>) -> ChannelPolicy {
        ChannelPolicy::FirstFree
    }

    /// Route `pin` to `channel`, program the triggers and enable the line
    fn arm(&mut self, channel: usize, pin: GpioBit<Self::Mux>, edges: Edges, priority: u8);

    /// Stop `channel` from raising interrupts for `pin`
    fn disarm(&mut self, channel: usize, pin: GpioBit<Self::Mux>);

    /// Check the hardware pending flag of `channel`
    fn is_pending(&self, channel: usize) -> bool;

    /// Polarity of the event pending on `channel`, `true` for rising
    fn rising_edge(&self, channel: usize, pin: GpioBit<Self::Mux>) -> bool;

    /// Acknowledge the event pending on `channel`
    fn clear_pending(&mut self, channel: usize);
}
