//! POSIX simulation backend for the MUJU HAL
//!
//! Runs board programs on a development host:
//!
//! - [`gpio`] - four emulated 8-bit ports drawn on the terminal
//! - [`keyboard`] - digits `1`-`8` toggle GPIO0 bits and raise pin events
//! - [`tick`] - system tick on a sleeping thread
//! - [`console`] - serial console on stdout
//!
//! ```no_run
//! use muju_hal::{GpioConfig, GpioController};
//! use muju_hal_posix::{keyboard, pins, Controller, PosixGpio};
//!
//! let gpio: &'static Controller =
//!     Box::leak(Box::new(GpioController::new(PosixGpio::terminal(), GpioConfig::DEFAULT)));
//! gpio.set_direction(&pins::GPIO3_0, true);
//! keyboard::spawn(gpio, None)?;
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod console;
mod display;
pub mod gpio;
pub mod keyboard;
pub mod pins;
pub mod tick;

pub use console::{ConsoleInput, StdoutConsole};
pub use gpio::{Controller, PosixGpio, CHANNELS};
pub use tick::ThreadTick;
