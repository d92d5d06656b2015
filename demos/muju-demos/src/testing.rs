//! Shared test fixtures

use std::collections::VecDeque;

use muju_hal::sci::{SciError, SciEventCallback, SciLine, SciStatus, SerialPort};
use muju_hal::{EventContext, GpioConfig, GpioController};
use muju_hal_posix::{Controller, PosixGpio};

pub fn controller() -> Controller {
    GpioController::new(PosixGpio::headless(), GpioConfig::DEFAULT)
}

/// Serial port recording output and serving queued input
#[derive(Default)]
pub struct Capture {
    pub output: Vec<u8>,
    pub input: VecDeque<u8>,
    pub handler: Option<(SciEventCallback, EventContext)>,
}

impl Capture {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.output).unwrap()
    }
}

impl SerialPort for Capture {
    fn configure(&mut self, line: &SciLine) -> Result<(), SciError> {
        line.validate()
    }

    fn send(&mut self, data: &[u8]) -> usize {
        self.output.extend_from_slice(data);
        data.len()
    }

    fn receive(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.input.len());
        for (slot, byte) in buf.iter_mut().zip(self.input.drain(..count)) {
            *slot = byte;
        }
        count
    }

    fn status(&self) -> SciStatus {
        SciStatus {
            data_ready: !self.input.is_empty(),
            ..SciStatus::default()
        }
    }

    fn set_event_handler(&mut self, handler: Option<SciEventCallback>, context: EventContext) {
        self.handler = handler.map(|handler| (handler, context));
    }
}
