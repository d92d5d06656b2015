//! Serial console abstractions
//!
//! Provides the line settings and the non-blocking port trait used by the
//! demo console. Chip crates implement [`SerialPort`] for their UARTs.

use core::fmt;

use crate::events::EventContext;

/// Parity control of a serial line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(rename_all = "lowercase"))]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Odd number of ones including the parity bit
    Odd,
    /// Even number of ones including the parity bit
    Even,
    /// Parity bit always set
    Mark,
    /// Parity bit always clear
    Space,
}

/// Serial line settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct SciLine {
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// Bits per character (5 to 9)
    pub data_bits: u8,
    /// Parity mode
    pub parity: Parity,
}

impl SciLine {
    /// 115200 8N1
    pub const DEFAULT: Self = Self {
        baud_rate: 115_200,
        data_bits: 8,
        parity: Parity::None,
    };

    /// Check the settings before handing them to a port
    pub fn validate(&self) -> Result<(), SciError> {
        if self.baud_rate == 0 {
            return Err(SciError::InvalidBaudRate);
        }
        if !(5..=9).contains(&self.data_bits) {
            return Err(SciError::InvalidDataBits(self.data_bits));
        }
        Ok(())
    }
}

impl Default for SciLine {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Status flags of a serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SciStatus {
    /// Received data is waiting in the input fifo
    pub data_ready: bool,
    /// Input fifo data was overwritten
    pub overrun: bool,
    /// Parity check failed on received data
    pub parity_error: bool,
    /// Start or stop bits were wrong on received data
    pub framing_error: bool,
    /// Break detected on the reception line
    pub break_signal: bool,
    /// Output fifo accepts more data
    pub fifo_empty: bool,
    /// Everything in the output fifo has been shifted out
    pub transmission_completed: bool,
}

/// Serial port errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SciError {
    /// Baud rate of zero
    InvalidBaudRate,
    /// Character size the port cannot generate
    InvalidDataBits(u8),
    /// Port did not accept data and reported no progress
    Stalled,
}

impl fmt::Display for SciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SciError::InvalidBaudRate => write!(f, "baud rate must not be zero"),
            SciError::InvalidDataBits(bits) => write!(f, "unsupported character size {}", bits),
            SciError::Stalled => write!(f, "serial port stopped accepting data"),
        }
    }
}

/// Function called when a serial port reports news
///
/// Receives the port status at the time of the event and the context given
/// at registration. It may run in interrupt context (or on another thread),
/// so it should only record the news for the application to act on.
pub type SciEventCallback = fn(SciStatus, EventContext);

/// Non-blocking serial port
pub trait SerialPort {
    /// Apply line settings; the port is unusable until this succeeds
    fn configure(&mut self, line: &SciLine) -> Result<(), SciError>;

    /// Put as much of `data` as fits into the output fifo
    ///
    /// Returns the number of bytes accepted.
    fn send(&mut self, data: &[u8]) -> usize;

    /// Take up to `buf.len()` bytes from the input fifo
    ///
    /// Returns the number of bytes stored.
    fn receive(&mut self, buf: &mut [u8]) -> usize;

    /// Read the status flags
    fn status(&self) -> SciStatus;

    /// Call `handler` each time received data becomes ready
    ///
    /// Replaces any previous handler; `None` stops the calls.
    fn set_event_handler(&mut self, handler: Option<SciEventCallback>, context: EventContext);

    /// Send the whole of `data`, retrying while the fifo is full
    ///
    /// Gives up with [`SciError::Stalled`] after `data.len() + 1`
    /// consecutive calls that accept nothing.
    fn send_all(&mut self, mut data: &[u8]) -> Result<(), SciError> {
        let mut idle = 0;
        while !data.is_empty() {
            let sent = self.send(data).min(data.len());
            if sent == 0 {
                idle += 1;
                if idle > data.len() {
                    return Err(SciError::Stalled);
                }
                continue;
            }
            idle = 0;
            data = &data[sent..];
        }
        Ok(())
    }
}
