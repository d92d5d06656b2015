//! Serial console on the process terminal
//!
//! Output goes to stdout (or any writer). Input is whatever the keyboard
//! thread forwards into the shared [`ConsoleInput`] queue; the registered
//! event handler runs on that thread after each delivery.

use std::collections::VecDeque;
use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use muju_hal::sci::{SciError, SciEventCallback, SciLine, SciStatus, SerialPort};
use muju_hal::EventContext;

type Handler = Option<(SciEventCallback, EventContext)>;

/// Received bytes waiting to be read, shared between threads
#[derive(Clone, Default)]
pub struct ConsoleInput {
    queue: Arc<Mutex<VecDeque<u8>>>,
    handler: Arc<Mutex<Handler>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `data` as if it arrived on the line
    ///
    /// The event handler, if any, runs once the bytes are readable.
    pub fn feed(&self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.lock().extend(data);

        let handler = *self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some((callback, context)) = handler {
            callback(Self::status(true), context);
        }
    }

    fn set_handler(&self, handler: Handler) {
        *self
            .handler
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = handler;
    }

    fn status(data_ready: bool) -> SciStatus {
        SciStatus {
            data_ready,
            fifo_empty: true,
            transmission_completed: true,
            ..SciStatus::default()
        }
    }

    /// Move up to `buf.len()` queued bytes into `buf`
    pub fn take(&self, buf: &mut [u8]) -> usize {
        let mut queue = self.lock();
        let count = buf.len().min(queue.len());
        for (slot, byte) in buf.iter_mut().zip(queue.drain(..count)) {
            *slot = byte;
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<u8>> {
        // A panicking producer leaves the queue itself intact
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// [`SerialPort`] writing to a terminal
pub struct StdoutConsole<W: Write = Stdout> {
    out: W,
    input: ConsoleInput,
    line: Option<SciLine>,
}

impl StdoutConsole {
    /// Console on the process stdout
    pub fn stdout(input: ConsoleInput) -> Self {
        Self::new(io::stdout(), input)
    }
}

impl<W: Write> StdoutConsole<W> {
    pub fn new(out: W, input: ConsoleInput) -> Self {
        Self {
            out,
            input,
            line: None,
        }
    }

    /// Settings applied by the last successful [`SerialPort::configure`]
    pub fn line(&self) -> Option<SciLine> {
        self.line
    }

    /// Give back the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SerialPort for StdoutConsole<W> {
    fn configure(&mut self, line: &SciLine) -> Result<(), SciError> {
        line.validate()?;
        self.line = Some(*line);
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> usize {
        if self.line.is_none() {
            return 0;
        }
        match self.out.write(data) {
            Ok(written) => {
                let _ = self.out.flush();
                written
            }
            Err(_) => 0,
        }
    }

    fn receive(&mut self, buf: &mut [u8]) -> usize {
        if self.line.is_none() {
            return 0;
        }
        self.input.take(buf)
    }

    fn status(&self) -> SciStatus {
        ConsoleInput::status(!self.input.is_empty())
    }

    fn set_event_handler(&mut self, handler: Option<SciEventCallback>, context: EventContext) {
        self.input
            .set_handler(handler.map(|callback| (callback, context)));
    }
}
