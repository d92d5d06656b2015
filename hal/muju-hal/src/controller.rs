//! GPIO controller
//!
//! [`GpioController`] is the surface application code talks to. It owns a
//! backend and the event table behind one critical-section mutex, so
//! registration from thread context and dispatch from interrupt context
//! never observe a half-written slot.
//!
//! Every primitive accepts `impl Into<Option<GpioBit<_>>>`. Passing `None`
//! (a pin the board does not have) is a no-op that never reaches the
//! backend; getters return `false`.

use core::cell::RefCell;
use core::ops::Range;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::chip::{ChipPins, Pull};
use crate::config::GpioConfig;
use crate::events::{Binding, EventCallback, EventContext, EventError, EventTable};
use crate::gpio::{Edges, GpioBackend, GpioBit};

struct Inner<B: GpioBackend, const N: usize> {
    backend: B,
    table: EventTable<B::Mux, N>,
    config: GpioConfig,
}

/// GPIO primitives and event dispatch over backend `B` with `N` channels
pub struct GpioController<B: GpioBackend, const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner<B, N>>>,
}

impl<B: GpioBackend, const N: usize> GpioController<B, N> {
    /// Create a controller with every channel free
    ///
    /// `const` so the controller can live in a `static` shared with the
    /// interrupt handlers.
    pub const fn new(backend: B, config: GpioConfig) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                backend,
                table: EventTable::new(),
                config,
            })),
        }
    }

    /// Number of interrupt channels
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Settings given at construction
    pub fn config(&self) -> GpioConfig {
        self.inner.lock(|inner| inner.borrow().config)
    }

    /// Run `f` with exclusive access to the backend
    ///
    /// Intended for backend-specific operations (simulated input, register
    /// inspection). `f` must not call back into this controller.
    pub fn with_backend<R>(&self, f: impl FnOnce(&mut B) -> R) -> R {
        self.inner.lock(|inner| f(&mut inner.borrow_mut().backend))
    }

    /// Configure `pin` as output (`true`) or input
    pub fn set_direction(&self, pin: impl Into<Option<GpioBit<B::Mux>>>, output: bool) {
        if let Some(pin) = pin.into() {
            self.inner
                .lock(|inner| inner.borrow_mut().backend.set_direction(pin, output));
        }
    }

    /// Current level of `pin`
    pub fn get_state(&self, pin: impl Into<Option<GpioBit<B::Mux>>>) -> bool {
        match pin.into() {
            Some(pin) => self.inner.lock(|inner| inner.borrow().backend.get_state(pin)),
            None => false,
        }
    }

    /// Drive `pin` to `state`
    pub fn set_state(&self, pin: impl Into<Option<GpioBit<B::Mux>>>, state: bool) {
        if let Some(pin) = pin.into() {
            self.inner
                .lock(|inner| inner.borrow_mut().backend.set_state(pin, state));
        }
    }

    /// Drive `pin` high
    pub fn set(&self, pin: impl Into<Option<GpioBit<B::Mux>>>) {
        self.set_state(pin, true);
    }

    /// Drive `pin` low
    pub fn clear(&self, pin: impl Into<Option<GpioBit<B::Mux>>>) {
        self.set_state(pin, false);
    }

    /// Invert the level of `pin`
    pub fn toggle(&self, pin: impl Into<Option<GpioBit<B::Mux>>>) {
        if let Some(pin) = pin.into() {
            self.inner.lock(|inner| inner.borrow_mut().backend.toggle(pin));
        }
    }

    /// Arm, rearm or clear the event handler of `pin`
    ///
    /// With a callback and at least one edge, the pin keeps the channel it
    /// already has or claims a new one according to the backend's
    /// [`ChannelPolicy`](crate::gpio::ChannelPolicy), and the hardware is
    /// armed for exactly the requested edges.
    ///
    /// Without a callback or without edges, the pin's channel (if any) is
    /// released and disarmed.
    ///
    /// # Errors
    /// [`EventError::NoFreeChannel`] or [`EventError::ChannelInUse`] when
    /// no channel can serve the pin. The table and the hardware are left
    /// exactly as they were.
    pub fn set_event_handler(
        &self,
        pin: impl Into<Option<GpioBit<B::Mux>>>,
        callback: Option<EventCallback<B::Mux>>,
        context: EventContext,
        rising: bool,
        falling: bool,
    ) -> Result<(), EventError> {
        let Some(pin) = pin.into() else {
            return Ok(());
        };
        let edges = Edges::new(rising, falling);

        self.inner.lock(|inner| {
            let mut guard = inner.borrow_mut();
            let inner = &mut *guard;

            match callback {
                Some(callback) if edges.any() => {
                    let policy = inner.backend.channel_policy(pin);
                    let channel = match inner.table.allocate(pin, policy) {
                        Ok(channel) => channel,
                        Err(err) => {
                            warn!(
                                "no channel for gpio {}.{}: {}",
                                pin.gpio(),
                                pin.bit(),
                                err
                            );
                            return Err(err);
                        }
                    };

                    inner.table.bind(
                        channel,
                        Binding {
                            pin,
                            callback,
                            context,
                            edges,
                        },
                    );
                    inner
                        .backend
                        .arm(channel, pin, edges, inner.config.priority);
                    debug!(
                        "gpio {}.{} armed on channel {}",
                        pin.gpio(),
                        pin.bit(),
                        channel
                    );
                }
                _ => {
                    if let Some(channel) = inner.table.find(pin) {
                        inner.table.release(channel);
                        inner.backend.disarm(channel, pin);
                        debug!("channel {} released", channel);
                    }
                }
            }
            Ok(())
        })
    }

    /// Channel serving `pin`, if it has a handler
    pub fn channel_of(&self, pin: impl Into<Option<GpioBit<B::Mux>>>) -> Option<usize> {
        let pin = pin.into()?;
        self.inner.lock(|inner| inner.borrow().table.find(pin))
    }

    /// Number of armed channels
    pub fn occupancy(&self) -> usize {
        self.inner.lock(|inner| inner.borrow().table.occupancy())
    }

    /// Service an event on `channel`
    ///
    /// Determines the polarity, acknowledges the pending flag and then, with
    /// the lock released, calls the registered callback. The callback may
    /// therefore use any controller method, including re-registration.
    ///
    /// Returns `true` if a callback ran. A channel with no binding only has
    /// its flag cleared.
    pub fn dispatch(&self, channel: usize) -> bool {
        if channel >= N {
            return false;
        }

        let event = self.inner.lock(|inner| {
            let mut guard = inner.borrow_mut();
            let inner = &mut *guard;

            let Some(binding) = inner.table.get(channel).copied() else {
                inner.backend.clear_pending(channel);
                trace!("spurious event on channel {}", channel);
                return None;
            };

            let rising = inner.backend.rising_edge(channel, binding.pin);
            inner.backend.clear_pending(channel);

            if B::SOFTWARE_EDGE_FILTER && !binding.edges.accepts(rising) {
                return None;
            }
            Some((binding, rising))
        });

        match event {
            Some((binding, rising)) => {
                (binding.callback)(binding.pin, rising, binding.context);
                true
            }
            None => false,
        }
    }

    /// Service every pending channel in `channels`, in ascending order
    ///
    /// For vectors shared by several channels. Returns the number of
    /// callbacks that ran.
    pub fn dispatch_pending(&self, channels: Range<usize>) -> usize {
        let channels = channels.start.min(N)..channels.end.min(N);
        let mut handled = 0;
        for channel in channels {
            let pending = self
                .inner
                .lock(|inner| inner.borrow().backend.is_pending(channel));
            if pending && self.dispatch(channel) {
                handled += 1;
            }
        }
        handled
    }
}

impl<B: GpioBackend + ChipPins, const N: usize> GpioController<B, N> {
    /// Route `function` to chip pin `pin` and set its pull resistors
    pub fn set_pin_function(
        &self,
        pin: impl Into<Option<B::ChipPin>>,
        function: u8,
        pull: Pull,
    ) {
        if let Some(pin) = pin.into() {
            self.inner
                .lock(|inner| inner.borrow_mut().backend.set_function(pin, function, pull));
        }
    }

    /// Enable or disable the pull-up of chip pin `pin`
    pub fn set_pull_up(&self, pin: impl Into<Option<B::ChipPin>>, enable: bool) {
        self.update_pull(pin.into(), |pull| pull.with_up(enable));
    }

    /// Enable or disable the pull-down of chip pin `pin`
    pub fn set_pull_down(&self, pin: impl Into<Option<B::ChipPin>>, enable: bool) {
        self.update_pull(pin.into(), |pull| pull.with_down(enable));
    }

    fn update_pull(&self, pin: Option<B::ChipPin>, change: impl FnOnce(Pull) -> Pull) {
        if let Some(pin) = pin {
            self.inner.lock(|inner| {
                let mut inner = inner.borrow_mut();
                let pull = change(inner.backend.pull(pin));
                inner.backend.set_pull(pin, pull);
            });
        }
    }
}
