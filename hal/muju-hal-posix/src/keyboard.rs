//! Keyboard-driven inputs
//!
//! Digits `1` to `8` toggle bits 0 to 7 of GPIO0, emulating push buttons.
//! A line starting with `>` is console input instead: the rest of the line
//! goes to the [`ConsoleInput`] queue untouched.
//!
//! Standard input is read a line at a time, so keys take effect on Enter.

use std::io::{self, BufRead};
use std::thread::{self, JoinHandle};

use muju_hal::GpioBit;

use crate::console::ConsoleInput;
use crate::gpio::Controller;
use crate::pins;

/// Prefix routing a line to the console
pub const CONSOLE_PREFIX: char = '>';

/// Terminal toggled by `key`
pub fn key_pin(key: u8) -> Option<GpioBit<()>> {
    match key {
        b'1'..=b'8' => pins::find(0, key - b'1'),
        _ => None,
    }
}

/// Toggle the terminal behind `key` and service the event it raises
///
/// Returns `false` if `key` is not a key.
pub fn press(controller: &Controller, key: u8) -> bool {
    let Some(pin) = key_pin(key) else {
        return false;
    };
    if let Some(channel) = controller.with_backend(|gpio| gpio.press(pin)) {
        controller.dispatch(channel);
    }
    true
}

/// Process one line typed on the terminal
pub fn handle_line(controller: &Controller, line: &str, console: Option<&ConsoleInput>) {
    if let Some(text) = line.strip_prefix(CONSOLE_PREFIX) {
        if let Some(console) = console {
            console.feed(text.as_bytes());
        }
        return;
    }
    for key in line.bytes() {
        press(controller, key);
    }
}

/// Read standard input on a new thread until it closes
pub fn spawn(
    controller: &'static Controller,
    console: Option<ConsoleInput>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("keyboard".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => handle_line(controller, &line, console.as_ref()),
                    Err(err) => {
                        eprintln!("keyboard: {}", err);
                        break;
                    }
                }
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::PosixGpio;
    use crate::pins::{GPIO0_0, GPIO0_7};
    use muju_hal::gpio::same_pin;
    use muju_hal::{EventContext, GpioConfig, GpioController};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn controller() -> Controller {
        GpioController::new(PosixGpio::headless(), GpioConfig::DEFAULT)
    }

    fn count(_: GpioBit<()>, _: bool, context: EventContext) {
        if let Some(counter) = context.downcast_ref::<AtomicU32>() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_key_map() {
        assert!(same_pin(key_pin(b'1').unwrap(), &GPIO0_0));
        assert!(same_pin(key_pin(b'8').unwrap(), &GPIO0_7));
        assert!(key_pin(b'0').is_none());
        assert!(key_pin(b'9').is_none());
        assert!(key_pin(b'a').is_none());
    }

    #[test]
    fn test_press_toggles_and_dispatches() {
        static COUNT: AtomicU32 = AtomicU32::new(0);
        let gpio = controller();
        gpio.set_event_handler(&GPIO0_0, Some(count), &COUNT, true, true)
            .unwrap();

        assert!(press(&gpio, b'1'));
        assert!(gpio.get_state(&GPIO0_0));
        assert_eq!(COUNT.load(Ordering::SeqCst), 1);

        assert!(!press(&gpio, b'x'));
        assert_eq!(COUNT.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_falling_only_key() {
        static COUNT: AtomicU32 = AtomicU32::new(0);
        let gpio = controller();
        gpio.set_direction(&GPIO0_0, false);
        gpio.set_event_handler(&GPIO0_0, Some(count), &COUNT, false, true)
            .unwrap();

        // Press (falls), release (rises), press (falls)
        handle_line(&gpio, "111", None);
        assert_eq!(COUNT.load(Ordering::SeqCst), 2);
        assert!(!gpio.get_state(&GPIO0_0));
    }

    #[test]
    fn test_console_lines() {
        let gpio = controller();
        let console = ConsoleInput::new();

        handle_line(&gpio, ">12", Some(&console));
        assert!(!gpio.get_state(&GPIO0_0));

        let mut buf = [0; 4];
        assert_eq!(console.take(&mut buf), 2);
        assert_eq!(&buf[..2], b"12");

        // Without a console the line is dropped
        handle_line(&gpio, ">1", None);
        assert!(!gpio.get_state(&GPIO0_0));
    }
}
