//! LPC43xx backend for the MUJU HAL
//!
//! Implements [`muju_hal::GpioBackend`] on top of the SCU pin multiplexer,
//! the GPIO port block and the eight-channel GPIO pin-interrupt block
//! (PINT). Targets the EDU-CIAA-NXP (LPC4337).
//!
//! # Features
//!
//! - `mmio` - Enable [`regs::Lpc43xxMmio`], the register layer for the real chip
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! ```ignore
//! use muju_hal::GpioConfig;
//! use muju_hal_lpc43xx::{pins, Controller, Lpc43xx, Lpc43xxMmio};
//!
//! static GPIO: Controller<Lpc43xxMmio> =
//!     Controller::new(Lpc43xx::new(Lpc43xxMmio::new()), GpioConfig::DEFAULT);
//!
//! #[interrupt]
//! fn PIN_INT0() {
//!     muju_hal_lpc43xx::on_pin_int(&GPIO, 0);
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pins;
pub mod regs;

pub use gpio::{on_pin_int, Controller, Lpc43xx, CHANNELS};
pub use pins::{ScuMux, ScuPin};
pub use regs::{Lpc43xxRegisters, ScuMode};
#[cfg(feature = "mmio")]
pub use regs::Lpc43xxMmio;
