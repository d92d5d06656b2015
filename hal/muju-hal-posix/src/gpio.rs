//! Emulated GPIO backend
//!
//! Levels live in memory. Channels are plain routing slots: the keyboard
//! thread toggles a terminal and, if a channel watches it, latches an event
//! with the new level as polarity. The controller then drops edges the
//! handler did not ask for, since there is no trigger hardware to do it.

use std::io;

use muju_hal::gpio::{same_pin, Edges, GpioBackend, GpioBit};
use muju_hal::{ChipPins, GpioController, Pull};

use crate::display;
use crate::pins::PORTS;

/// Number of event channels, one per emulated terminal
pub const CHANNELS: usize = PORTS * 8;

/// Controller over the emulated ports
pub type Controller = GpioController<PosixGpio, CHANNELS>;

/// In-memory GPIO ports with optional terminal rendering
pub struct PosixGpio {
    ports: [u8; PORTS],
    pull_up: [u8; PORTS],
    pull_down: [u8; PORTS],
    terminal: bool,
    drawn: bool,
    routes: [Option<GpioBit<()>>; CHANNELS],
    pending: u32,
    rising: u32,
}

impl PosixGpio {
    /// Ports rendered on the terminal, for interactive programs
    pub const fn terminal() -> Self {
        Self::new(true)
    }

    /// Ports kept silently in memory
    pub const fn headless() -> Self {
        Self::new(false)
    }

    const fn new(terminal: bool) -> Self {
        Self {
            ports: [0; PORTS],
            pull_up: [0; PORTS],
            pull_down: [0; PORTS],
            terminal,
            drawn: false,
            routes: [None; CHANNELS],
            pending: 0,
            rising: 0,
        }
    }

    /// Raw level of every port
    pub fn ports(&self) -> [u8; PORTS] {
        self.ports
    }

    /// Toggle `pin` as a key press would, latching an event if it is watched
    ///
    /// Returns the channel with the latched event.
    pub fn press(&mut self, pin: GpioBit<()>) -> Option<usize> {
        self.toggle(pin);
        let level = self.get_state(pin);

        let channel = self
            .routes
            .iter()
            .position(|route| matches!(route, Some(routed) if same_pin(routed, pin)))?;
        let line = 1 << channel;
        self.pending |= line;
        if level {
            self.rising |= line;
        } else {
            self.rising &= !line;
        }
        Some(channel)
    }

    /// Port index and bit mask of `pin`, if it names an emulated terminal
    fn locate(pin: GpioBit<()>) -> Option<(usize, u8)> {
        let port = pin.gpio() as usize;
        (port < PORTS && pin.bit() < 8).then(|| (port, 1 << pin.bit()))
    }

    fn write(&mut self, pin: GpioBit<()>, level: bool) {
        let Some((port, mask)) = Self::locate(pin) else {
            return;
        };
        if level {
            self.ports[port] |= mask;
        } else {
            self.ports[port] &= !mask;
        }
        self.render(pin, level);
    }

    fn render(&mut self, pin: GpioBit<()>, level: bool) {
        if !self.terminal {
            return;
        }
        let mut out = io::stdout().lock();
        // Rendering is best effort; a closed terminal must not stop the program
        let _ = if self.drawn {
            display::refresh(&mut out, pin.gpio(), pin.bit(), level)
        } else {
            self.drawn = true;
            display::draw(&mut out, &self.ports)
        };
    }
}

impl GpioBackend for PosixGpio {
    type Mux = ();

    const SOFTWARE_EDGE_FILTER: bool = true;

    fn set_direction(&mut self, pin: GpioBit<()>, output: bool) {
        if !output {
            self.set_pull(pin, Pull::Up);
        } else if self.terminal && !self.drawn {
            self.render(pin, self.get_state(pin));
        }
    }

    fn get_state(&self, pin: GpioBit<()>) -> bool {
        Self::locate(pin).is_some_and(|(port, mask)| self.ports[port] & mask != 0)
    }

    fn set_state(&mut self, pin: GpioBit<()>, state: bool) {
        self.write(pin, state);
    }

    fn arm(&mut self, channel: usize, pin: GpioBit<()>, _edges: Edges, _priority: u8) {
        self.routes[channel] = Some(pin);
        self.pending &= !(1 << channel);
    }

    fn disarm(&mut self, channel: usize, _pin: GpioBit<()>) {
        self.routes[channel] = None;
        self.pending &= !(1 << channel);
    }

    fn is_pending(&self, channel: usize) -> bool {
        self.pending & (1 << channel) != 0
    }

    fn rising_edge(&self, channel: usize, _pin: GpioBit<()>) -> bool {
        self.rising & (1 << channel) != 0
    }

    fn clear_pending(&mut self, channel: usize) {
        self.pending &= !(1 << channel);
    }
}

/// Terminals double as chip pins. There is no multiplexer, so the function
/// number is ignored; a pull-up or pull-down drags the level of the pin.
impl ChipPins for PosixGpio {
    type ChipPin = GpioBit<()>;

    fn set_function(&mut self, pin: GpioBit<()>, _function: u8, pull: Pull) {
        self.set_pull(pin, pull);
    }

    fn pull(&self, pin: GpioBit<()>) -> Pull {
        match Self::locate(pin) {
            Some((port, mask)) => Pull::new(
                self.pull_up[port] & mask != 0,
                self.pull_down[port] & mask != 0,
            ),
            None => Pull::None,
        }
    }

    fn set_pull(&mut self, pin: GpioBit<()>, pull: Pull) {
        let Some((port, mask)) = Self::locate(pin) else {
            return;
        };
        let assign = |bits: &mut u8, on: bool| {
            *bits = if on { *bits | mask } else { *bits & !mask };
        };
        assign(&mut self.pull_up[port], pull.up());
        assign(&mut self.pull_down[port], pull.down());
        match pull {
            Pull::Up => self.write(pin, true),
            Pull::Down => self.write(pin, false),
            // Floating or fighting resistors keep the last level
            Pull::None | Pull::Both => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pins::{self, GPIO0_0, GPIO0_1, GPIO0_2, GPIO1_4, GPIO3_7};
    use muju_hal::gpio::PinDescriptor;
    use muju_hal::{EventContext, GpioConfig};
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
    use std::thread;

    fn controller() -> Controller {
        GpioController::new(PosixGpio::headless(), GpioConfig::DEFAULT)
    }

    fn count(_: GpioBit<()>, rising: bool, context: EventContext) {
        if let Some(counter) = context.downcast_ref::<AtomicU32>() {
            counter.fetch_add(if rising { 1 } else { 100 }, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_input_pulls_up() {
        let gpio = controller();
        gpio.set_direction(&GPIO0_1, false);
        assert!(gpio.get_state(&GPIO0_1));
        gpio.set_direction(&GPIO3_7, true);
        assert!(!gpio.get_state(&GPIO3_7));
        assert_eq!(gpio.with_backend(|b| b.ports()), [0x02, 0, 0, 0]);
    }

    #[test]
    fn test_outputs() {
        let gpio = controller();
        gpio.set(&GPIO3_7);
        assert!(gpio.get_state(&GPIO3_7));
        gpio.toggle(&GPIO3_7);
        assert!(!gpio.get_state(&GPIO3_7));
        gpio.set_state(&GPIO3_7, true);
        assert_eq!(gpio.with_backend(|b| b.ports())[3], 0x80);
    }

    #[test]
    fn test_press_unwatched_pin() {
        let gpio = controller();
        assert_eq!(gpio.with_backend(|b| b.press(&GPIO0_0)), None);
        assert!(gpio.get_state(&GPIO0_0));
    }

    #[test]
    fn test_rising_only_ignores_release() {
        static COUNT: AtomicU32 = AtomicU32::new(0);
        let gpio = controller();
        gpio.set_direction(&GPIO0_0, false);
        gpio.set_event_handler(&GPIO0_0, Some(count), &COUNT, true, false)
            .unwrap();

        // Pulled up: the first press falls, the second rises
        let channel = gpio.with_backend(|b| b.press(&GPIO0_0)).unwrap();
        assert!(!gpio.dispatch(channel));
        assert_eq!(COUNT.load(Ordering::SeqCst), 0);
        assert!(!gpio.with_backend(|b| b.is_pending(channel)));

        let channel = gpio.with_backend(|b| b.press(&GPIO0_0)).unwrap();
        assert!(gpio.dispatch(channel));
        assert_eq!(COUNT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_both_edges() {
        static COUNT: AtomicU32 = AtomicU32::new(0);
        let gpio = controller();
        gpio.set_event_handler(&GPIO0_1, Some(count), &COUNT, true, true)
            .unwrap();

        for _ in 0..2 {
            let channel = gpio.with_backend(|b| b.press(&GPIO0_1)).unwrap();
            assert!(gpio.dispatch(channel));
        }
        assert_eq!(COUNT.load(Ordering::SeqCst), 101);
    }

    #[test]
    fn test_cleared_handler_stops_routing() {
        static COUNT: AtomicU32 = AtomicU32::new(0);
        let gpio = controller();
        gpio.set_event_handler(&GPIO0_1, Some(count), &COUNT, true, true)
            .unwrap();
        gpio.set_event_handler(&GPIO0_1, None, &COUNT, true, true)
            .unwrap();

        assert_eq!(gpio.with_backend(|b| b.press(&GPIO0_1)), None);
    }

    #[test]
    fn test_every_terminal_gets_a_channel() {
        static COUNT: AtomicU32 = AtomicU32::new(0);
        let gpio = controller();
        assert_eq!(pins::ALL.len(), CHANNELS);

        for pin in pins::ALL {
            gpio.set_event_handler(*pin, Some(count), &COUNT, true, true)
                .unwrap();
        }
        assert_eq!(gpio.occupancy(), CHANNELS);

        let channel = gpio.with_backend(|b| b.press(&GPIO3_7)).unwrap();
        assert_eq!(channel, CHANNELS - 1);
        assert!(gpio.dispatch(channel));
        assert_eq!(COUNT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_foreign_descriptor_is_ignored() {
        static PORT_9: PinDescriptor<()> = PinDescriptor::new(9, 0, ());
        static BIT_12: PinDescriptor<()> = PinDescriptor::new(1, 12, ());
        let gpio = controller();

        for pin in [&PORT_9, &BIT_12] {
            gpio.set_direction(pin, false);
            gpio.set(pin);
            gpio.toggle(pin);
            assert!(!gpio.get_state(pin));
            gpio.set_pull_down(pin, true);
            assert_eq!(gpio.with_backend(|b| b.pull(pin)), Pull::None);
        }
        assert_eq!(gpio.with_backend(|b| b.ports()), [0; PORTS]);
    }

    #[test]
    fn test_pulls_drag_the_level() {
        let gpio = controller();

        gpio.set_pin_function(&GPIO1_4, 0, Pull::Down);
        assert!(!gpio.get_state(&GPIO1_4));
        gpio.set_pull_up(&GPIO1_4, true);
        assert_eq!(gpio.with_backend(|b| b.pull(&GPIO1_4)), Pull::Both);
        assert!(!gpio.get_state(&GPIO1_4));
        gpio.set_pull_down(&GPIO1_4, false);
        assert!(gpio.get_state(&GPIO1_4));

        gpio.set_direction(&GPIO0_1, false);
        assert_eq!(gpio.with_backend(|b| b.pull(&GPIO0_1)), Pull::Up);
    }

    #[test]
    fn test_registration_races_dispatch() {
        static GPIO: Controller =
            GpioController::new(PosixGpio::headless(), GpioConfig::DEFAULT);
        // Registrations begun and clears completed by the registering thread
        static STARTED: AtomicUsize = AtomicUsize::new(0);
        static CLEARED: AtomicUsize = AtomicUsize::new(0);
        static CALLS: AtomicU32 = AtomicU32::new(0);
        static DONE: AtomicBool = AtomicBool::new(false);
        const ROUNDS: usize = 2000;

        thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..ROUNDS {
                    STARTED.fetch_add(1, Ordering::SeqCst);
                    GPIO.set_event_handler(&GPIO0_2, Some(count), &CALLS, true, true)
                        .unwrap();
                    thread::yield_now();
                    GPIO.set_event_handler(&GPIO0_2, None, &CALLS, false, false)
                        .unwrap();
                    CLEARED.fetch_add(1, Ordering::SeqCst);
                }
                DONE.store(true, Ordering::SeqCst);
            });

            while !DONE.load(Ordering::SeqCst) {
                let channel = GPIO.with_backend(|b| b.press(&GPIO0_2)).unwrap_or(0);

                let started = STARTED.load(Ordering::SeqCst);
                let unbound = CLEARED.load(Ordering::SeqCst) == started;
                let ran = GPIO.dispatch(channel);
                let rebound = STARTED.load(Ordering::SeqCst) != started;

                // Nothing was registered for the whole dispatch
                if unbound && !rebound {
                    assert!(!ran, "callback ran for a cleared handler");
                }
            }
        });

        assert_eq!(GPIO.occupancy(), 0);
        assert_eq!(CLEARED.load(Ordering::SeqCst), ROUNDS);
    }
}
