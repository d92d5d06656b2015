//! MUJU Hardware Abstraction Layer
//!
//! This crate defines the board-independent part of the HAL: pin
//! descriptors, the trait every silicon backend implements, the GPIO
//! controller that owns the event registration table, and the system tick
//! and serial console abstractions. Chip crates provide the register glue.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (muju-demos, firmware)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  muju-hal (this crate - controller)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┼───────────┐
//!         ▼           ▼           ▼
//! ┌─────────────┐ ┌─────────────┐ ┌─────────────┐
//! │  muju-hal-  │ │  muju-hal-  │ │  muju-hal-  │
//! │   lpc43xx   │ │   stm32f1   │ │    posix    │
//! └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`gpio`] - Pin descriptors and the [`gpio::GpioBackend`] trait
//! - [`chip`] - Chip pin function and pull resistors
//! - [`events`] - Event registration table and channel allocation
//! - [`controller`] - [`GpioController`], the public GPIO surface
//! - [`irq`] - Interrupt controller lines used when arming channels
//! - [`tick`] - Periodic system tick
//! - [`sci`] - Serial console
//! - [`config`] - Runtime configuration
//!
//! Backend crates generate their descriptor statics with [`pin_table!`].

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod chip;
pub mod config;
pub mod controller;
pub mod events;
pub mod gpio;
pub mod irq;
mod pins;
pub mod sci;
pub mod tick;

#[cfg(test)]
mod mock;

// Re-export key types at crate root for convenience
pub use chip::{ChipPins, Pull};
pub use config::GpioConfig;
pub use controller::GpioController;
pub use events::{Binding, EventCallback, EventContext, EventError, EventTable};
pub use gpio::{ChannelPolicy, Edges, GpioBackend, GpioBit, PinDescriptor};
pub use irq::InterruptLines;
pub use sci::{SciEventCallback, SciLine, SerialPort};
pub use tick::{SystemTick, TickDispatcher};
