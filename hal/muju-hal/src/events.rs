//! Event registration table
//!
//! A fixed-size table maps an interrupt channel index to the pin it
//! watches and the callback to run. The slot index is the hardware channel
//! index: whatever the backend routes to channel `k` is described by slot
//! `k`, and nothing else.

use core::any::Any;
use core::fmt;

use crate::gpio::{same_pin, ChannelPolicy, Edges, GpioBit};

/// Opaque user data handed back to a callback
///
/// Callbacks recover their concrete type with `downcast_ref`.
pub type EventContext = &'static (dyn Any + Send + Sync);

/// Function called on a pin event
///
/// Arguments are the pin that fired, `true` for a rising edge, and the
/// context given at registration.
pub type EventCallback<M> = fn(GpioBit<M>, bool, EventContext);

/// Errors from event registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventError {
    /// Every channel is bound to another pin
    NoFreeChannel,
    /// The only channel this pin can use is bound to another pin
    ChannelInUse {
        /// Channel wired to the pin
        channel: usize,
    },
    /// The backend reported a channel beyond the table capacity
    InvalidChannel {
        /// Channel requested by the backend
        channel: usize,
    },
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::NoFreeChannel => write!(f, "no free interrupt channel"),
            EventError::ChannelInUse { channel } => {
                write!(f, "interrupt channel {} is bound to another pin", channel)
            }
            EventError::InvalidChannel { channel } => {
                write!(f, "interrupt channel {} does not exist", channel)
            }
        }
    }
}

/// An armed channel
pub struct Binding<M: 'static> {
    /// Pin routed to the channel
    pub pin: GpioBit<M>,
    /// Function to call on events
    pub callback: EventCallback<M>,
    /// User data passed to `callback`
    pub context: EventContext,
    /// Edges requested at registration
    pub edges: Edges,
}

// Manual impls: derive would require `M: Clone`, but only references are stored.
impl<M: 'static> Clone for Binding<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: 'static> Copy for Binding<M> {}

impl<M: 'static> fmt::Debug for Binding<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("gpio", &self.pin.gpio())
            .field("bit", &self.pin.bit())
            .field("edges", &self.edges)
            .finish_non_exhaustive()
    }
}

/// Fixed-capacity channel table
pub struct EventTable<M: 'static, const N: usize> {
    slots: [Option<Binding<M>>; N],
}

impl<M: 'static, const N: usize> Default for EventTable<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: 'static, const N: usize> EventTable<M, N> {
    const FREE: Option<Binding<M>> = None;

    /// Create a table with every slot free
    pub const fn new() -> Self {
        Self {
            slots: [Self::FREE; N],
        }
    }

    /// Number of channels
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bound channels
    pub fn occupancy(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Binding of `channel`, if armed
    pub fn get(&self, channel: usize) -> Option<&Binding<M>> {
        self.slots.get(channel).and_then(Option::as_ref)
    }

    /// Channel currently bound to `pin`
    pub fn find(&self, pin: GpioBit<M>) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(b) if same_pin(b.pin, pin)))
    }

    /// Pick the channel for `pin` without modifying the table
    ///
    /// A channel already bound to `pin` is reused. Otherwise the policy
    /// decides: the lowest free slot, or the wired slot if it is free.
    pub fn allocate(&self, pin: GpioBit<M>, policy: ChannelPolicy) -> Result<usize, EventError> {
        if let Some(channel) = self.find(pin) {
            return Ok(channel);
        }

        match policy {
            ChannelPolicy::FirstFree => self
                .slots
                .iter()
                .position(Option::is_none)
                .ok_or(EventError::NoFreeChannel),
            ChannelPolicy::Fixed(channel) => match self.slots.get(channel) {
                None => Err(EventError::InvalidChannel { channel }),
                Some(None) => Ok(channel),
                Some(Some(_)) => Err(EventError::ChannelInUse { channel }),
            },
        }
    }

    /// Store `binding` in `channel`, returning what was there
    ///
    /// # Panics
    /// If `channel >= N`. Use [`EventTable::allocate`] to obtain a valid index.
    pub fn bind(&mut self, channel: usize, binding: Binding<M>) -> Option<Binding<M>> {
        self.slots[channel].replace(binding)
    }

    /// Free `channel`, returning its previous binding
    pub fn release(&mut self, channel: usize) -> Option<Binding<M>> {
        self.slots.get_mut(channel).and_then(Option::take)
    }

    /// Iterate over armed channels in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Binding<M>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(channel, slot)| slot.as_ref().map(|b| (channel, b)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::PinDescriptor;
    use proptest::prelude::*;

    static PINS: [PinDescriptor<()>; 6] = [
        PinDescriptor::new(0, 0, ()),
        PinDescriptor::new(0, 1, ()),
        PinDescriptor::new(0, 2, ()),
        PinDescriptor::new(0, 3, ()),
        PinDescriptor::new(0, 4, ()),
        PinDescriptor::new(1, 0, ()),
    ];

    fn noop(_: GpioBit<()>, _: bool, _: EventContext) {}

    fn binding(pin: GpioBit<()>) -> Binding<()> {
        Binding {
            pin,
            callback: noop,
            context: &(),
            edges: Edges::BOTH,
        }
    }

    fn claim(table: &mut EventTable<(), 4>, pin: GpioBit<()>) -> Result<usize, EventError> {
        let channel = table.allocate(pin, ChannelPolicy::FirstFree)?;
        table.bind(channel, binding(pin));
        Ok(channel)
    }

    #[test]
    fn test_first_fit_ascending() {
        let mut table = EventTable::<(), 4>::new();
        assert_eq!(claim(&mut table, &PINS[3]), Ok(0));
        assert_eq!(claim(&mut table, &PINS[1]), Ok(1));
        table.release(0);
        // Freed slot 0 is preferred over slot 2
        assert_eq!(claim(&mut table, &PINS[2]), Ok(0));
    }

    #[test]
    fn test_reuse_existing() {
        let mut table = EventTable::<(), 4>::new();
        assert_eq!(claim(&mut table, &PINS[0]), Ok(0));
        assert_eq!(claim(&mut table, &PINS[0]), Ok(0));
        assert_eq!(table.occupancy(), 1);
    }

    #[test]
    fn test_exhaustion_leaves_table_untouched() {
        let mut table = EventTable::<(), 4>::new();
        for pin in &PINS[..4] {
            assert!(claim(&mut table, pin).is_ok());
        }
        assert_eq!(claim(&mut table, &PINS[4]), Err(EventError::NoFreeChannel));
        assert_eq!(table.occupancy(), 4);
        for (channel, pin) in PINS[..4].iter().enumerate() {
            assert_eq!(table.find(pin), Some(channel));
        }
        // Already bound pins still resolve on a full table
        assert_eq!(table.allocate(&PINS[2], ChannelPolicy::FirstFree), Ok(2));
    }

    #[test]
    fn test_fixed_policy() {
        let mut table = EventTable::<(), 4>::new();
        assert_eq!(table.allocate(&PINS[1], ChannelPolicy::Fixed(1)), Ok(1));
        table.bind(1, binding(&PINS[1]));

        // Same line, different port
        assert_eq!(
            table.allocate(&PINS[5], ChannelPolicy::Fixed(1)),
            Err(EventError::ChannelInUse { channel: 1 })
        );
        assert_eq!(
            table.allocate(&PINS[5], ChannelPolicy::Fixed(7)),
            Err(EventError::InvalidChannel { channel: 7 })
        );
    }

    #[test]
    fn test_release_out_of_range() {
        let mut table = EventTable::<(), 4>::new();
        assert!(table.release(9).is_none());
        assert!(table.get(9).is_none());
    }

    #[derive(Debug, Clone)]
    enum Op {
        Register(usize),
        Clear(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0..PINS.len()).prop_map(Op::Register),
            (0..PINS.len()).prop_map(Op::Clear),
        ]
    }

    proptest! {
        #[test]
        fn prop_table_invariants(ops in proptest::collection::vec(op(), 0..64)) {
            let mut table = EventTable::<(), 4>::new();
            let mut model: [Option<usize>; 4] = [None; 4];

            for op in ops {
                match op {
                    Op::Register(p) => {
                        let before = model;
                        match claim(&mut table, &PINS[p]) {
                            Ok(channel) => {
                                if let Some(existing) = model.iter().position(|s| *s == Some(p)) {
                                    prop_assert_eq!(existing, channel);
                                } else {
                                    prop_assert_eq!(model.iter().position(Option::is_none), Some(channel));
                                }
                                model[channel] = Some(p);
                            }
                            Err(EventError::NoFreeChannel) => {
                                prop_assert!(model.iter().all(Option::is_some));
                                prop_assert_eq!(before, model);
                            }
                            Err(e) => prop_assert!(false, "unexpected {:?}", e),
                        }
                    }
                    Op::Clear(p) => {
                        if let Some(channel) = table.find(&PINS[p]) {
                            table.release(channel);
                            model[channel] = None;
                        }
                    }
                }

                // At most one slot per pin, and the table matches the model
                for (i, pin) in PINS.iter().enumerate() {
                    let bound = model.iter().filter(|s| **s == Some(i)).count();
                    prop_assert!(bound <= 1);
                    prop_assert_eq!(table.find(pin), model.iter().position(|s| *s == Some(i)));
                }
                prop_assert_eq!(table.occupancy(), model.iter().filter(|s| s.is_some()).count());
            }
        }
    }
}
