//! STM32F1xx backend for the MUJU HAL
//!
//! Implements [`muju_hal::GpioBackend`] with the GPIO ports, AFIO EXTI
//! source selection and the EXTI controller of the STM32F103 found on
//! the Blue Pill.
//!
//! # Features
//!
//! - `mmio` - Enable [`regs::Stm32f1Pac`], the register layer for the real chip (`stm32f1` device crate)
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! Bind the EXTI vectors to the entry points:
//!
//! ```ignore
//! static GPIO: Controller<Stm32f1Pac> =
//!     Controller::new(Stm32f1::new(Stm32f1Pac::new()), GpioConfig::DEFAULT);
//!
//! #[interrupt]
//! fn EXTI9_5() {
//!     muju_hal_stm32f1::on_exti9_5(&GPIO);
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pins;
pub mod regs;

pub use gpio::{
    on_exti0, on_exti1, on_exti15_10, on_exti2, on_exti3, on_exti4, on_exti9_5, Controller,
    Stm32f1, CHANNELS,
};
pub use pins::ChipPin;
pub use regs::{PortMode, Stm32f1Registers};
#[cfg(feature = "mmio")]
pub use regs::Stm32f1Pac;
