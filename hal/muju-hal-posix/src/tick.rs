//! System tick on a host thread

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use muju_hal::tick::{SystemTick, TickCallback, TickDispatcher};
use muju_hal::EventContext;

/// Tick source sleeping `period` between calls
///
/// The period is a lower bound: scheduling jitter and the handler's own run
/// time add to it.
pub struct ThreadTick {
    dispatcher: &'static TickDispatcher,
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ThreadTick {
    pub fn new(dispatcher: &'static TickDispatcher) -> Self {
        Self {
            dispatcher,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Check whether the tick thread is alive
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the tick thread and wait for it to exit
    ///
    /// The handler stays installed in the dispatcher.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            // From inside a tick handler the thread just exits on its own
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

impl SystemTick for ThreadTick {
    fn start(&mut self, callback: TickCallback, context: EventContext, period_us: u32) {
        self.stop();
        self.dispatcher.install(callback, context);

        let running = Arc::new(AtomicBool::new(true));
        let dispatcher = self.dispatcher;
        let period = Duration::from_micros(u64::from(period_us));
        let flag = Arc::clone(&running);
        let spawned = thread::Builder::new().name("tick".into()).spawn(move || {
            while flag.load(Ordering::Acquire) {
                thread::sleep(period);
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                dispatcher.fire();
            }
        });

        match spawned {
            Ok(handle) => {
                self.running = running;
                self.thread = Some(handle);
            }
            Err(err) => eprintln!("tick: cannot start timer thread: {}", err),
        }
    }
}

impl Drop for ThreadTick {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn count(context: EventContext) {
        if let Some(counter) = context.downcast_ref::<AtomicU32>() {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_ticks_until_stopped() {
        static DISPATCHER: TickDispatcher = TickDispatcher::new();
        static COUNT: AtomicU32 = AtomicU32::new(0);

        let mut tick = ThreadTick::new(&DISPATCHER);
        assert!(!tick.is_running());
        tick.start(count, &COUNT, 1_000);
        assert!(tick.is_running());

        thread::sleep(Duration::from_millis(50));
        tick.stop();
        assert!(!tick.is_running());

        let ticks = COUNT.load(Ordering::SeqCst);
        assert!(ticks > 0);
        thread::sleep(Duration::from_millis(10));
        assert_eq!(COUNT.load(Ordering::SeqCst), ticks);
    }

    #[test]
    fn test_restart_replaces_handler() {
        static DISPATCHER: TickDispatcher = TickDispatcher::new();
        static FIRST: AtomicU32 = AtomicU32::new(0);
        static SECOND: AtomicU32 = AtomicU32::new(0);

        let mut tick = ThreadTick::new(&DISPATCHER);
        tick.start(count, &FIRST, 1_000);
        tick.start(count, &SECOND, 1_000);
        let first = FIRST.load(Ordering::SeqCst);

        thread::sleep(Duration::from_millis(30));
        drop(tick);

        assert_eq!(FIRST.load(Ordering::SeqCst), first);
        assert!(SECOND.load(Ordering::SeqCst) > 0);
    }
}
