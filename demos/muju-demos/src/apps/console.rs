//! Console commands
//!
//! | Byte | Action        |
//! |------|---------------|
//! | `1`  | led 1 on      |
//! | `2`  | led 1 off     |
//! | `3`  | toggle led 2  |
//!
//! Anything else is ignored. The port's event handler flags arriving data
//! through [`ConsoleReady`]; the main loop then drains it with [`poll`].

use core::sync::atomic::{AtomicBool, Ordering};

use muju_hal::sci::{SciStatus, SerialPort};
use muju_hal::{EventContext, GpioBackend, GpioController};

use crate::board::Board;

/// Set from the serial event handler when received data is ready
#[derive(Debug, Default)]
pub struct ConsoleReady {
    ready: AtomicBool,
}

impl ConsoleReady {
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    /// Serial event handler; `context` is the [`ConsoleReady`] to flag
    pub fn on_event(status: SciStatus, context: EventContext) {
        if let Some(this) = context.downcast_ref::<ConsoleReady>() {
            if status.data_ready {
                this.ready.store(true, Ordering::Release);
            }
        }
    }

    /// Whether data arrived since the last call
    pub fn take(&self) -> bool {
        self.ready.swap(false, Ordering::AcqRel)
    }
}

/// Apply the command `byte`; returns `false` for unknown bytes
pub fn command<B: GpioBackend, const N: usize>(
    gpio: &GpioController<B, N>,
    board: &Board<B::Mux>,
    byte: u8,
) -> bool {
    match byte {
        b'1' => gpio.set(board.led1),
        b'2' => gpio.clear(board.led1),
        b'3' => gpio.toggle(board.led2),
        _ => return false,
    }
    true
}

/// Drain the console input, applying every command received
///
/// Returns the number of commands applied.
pub fn poll<B: GpioBackend, const N: usize>(
    gpio: &GpioController<B, N>,
    board: &Board<B::Mux>,
    console: &mut impl SerialPort,
) -> usize {
    let mut applied = 0;
    let mut byte = [0];
    while console.status().data_ready && console.receive(&mut byte) == 1 {
        if command(gpio, board, byte[0]) {
            applied += 1;
        }
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::posix::BOARD;
    use crate::testing::{controller, Capture};

    #[test]
    fn test_commands() {
        let gpio = controller();
        BOARD.setup(&gpio);

        assert!(command(&gpio, &BOARD, b'1'));
        assert!(gpio.get_state(BOARD.led1));
        assert!(command(&gpio, &BOARD, b'2'));
        assert!(!gpio.get_state(BOARD.led1));
        assert!(command(&gpio, &BOARD, b'3'));
        assert!(gpio.get_state(BOARD.led2));
        assert!(!command(&gpio, &BOARD, b'x'));
    }

    #[test]
    fn test_poll_drains_input() {
        let gpio = controller();
        BOARD.setup(&gpio);
        let mut console = Capture::default();
        console.input.extend(b"13?3".iter());

        assert_eq!(poll(&gpio, &BOARD, &mut console), 3);
        assert!(gpio.get_state(BOARD.led1));
        assert!(!gpio.get_state(BOARD.led2));
        assert!(console.input.is_empty());
        assert_eq!(poll(&gpio, &BOARD, &mut console), 0);
    }

    #[test]
    fn test_ready_flag_from_event() {
        static READY: ConsoleReady = ConsoleReady::new();
        let mut console = Capture::default();
        console.set_event_handler(Some(ConsoleReady::on_event), &READY);

        let (handler, context) = console.handler.unwrap();
        handler(SciStatus::default(), context);
        assert!(!READY.take());

        let status = SciStatus {
            data_ready: true,
            ..SciStatus::default()
        };
        handler(status, context);
        assert!(READY.take());
        assert!(!READY.take());
    }
}
