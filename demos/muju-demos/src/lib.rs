//! MUJU demo programs
//!
//! Board pin maps and small behaviours exercising the HAL: a blinking RGB
//! led reporting on the console, leds driven by keys (polled and
//! event-driven) and console commands. Everything is generic over the
//! backend; the `demo-hal` binary runs it on the POSIX simulator.
//!
//! # Modules
//!
//! - [`board`] - Led and key assignment per board
//! - [`apps`] - The demo behaviours
//! - [`config`] - TOML settings for the binary

pub mod apps;
pub mod board;
pub mod config;

#[cfg(test)]
mod testing;

pub use board::{Board, RgbLed};
pub use config::{ConfigError, DemoConfig};
