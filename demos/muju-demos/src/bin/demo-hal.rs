//! HAL demo on the POSIX simulator
//!
//! Usage: `demo-hal [config.toml]`
//!
//! - The RGB led cycles red, green and blue, announcing each step.
//! - Keys `1`/`2` turn led 1 on/off, key `3` toggles led 2, key `4` lights
//!   led 3 while held and its presses are counted from pin events.
//! - `>1`, `>2`, `>3` send the same led commands through the console.
//!
//! The terminal stays in its normal line mode: type the keys, then press
//! Enter. Several keys on one line are applied in order.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::thread::{self, Thread};

use muju_demos::apps::console::ConsoleReady;
use muju_demos::apps::{self, follow_key, switch_led, KeyCounter, KeyToggle, RgbSequencer};
use muju_demos::board::posix;
use muju_demos::DemoConfig;
use muju_hal::sci::{SciStatus, SerialPort};
use muju_hal::tick::{SystemTick, TickDispatcher};
use muju_hal::{EventContext, GpioController};
use muju_hal_posix::{keyboard, pins, ConsoleInput, Controller, PosixGpio, StdoutConsole, ThreadTick};

static TICK: TickDispatcher = TickDispatcher::new();
static NEW_TICK: AtomicBool = AtomicBool::new(false);
static MAIN: OnceLock<Thread> = OnceLock::new();
static KEY4_PRESSES: KeyCounter = KeyCounter::new();
static CONSOLE_READY: ConsoleReady = ConsoleReady::new();

fn wake_main() {
    if let Some(main) = MAIN.get() {
        main.unpark();
    }
}

fn on_tick(context: EventContext) {
    if let Some(flag) = context.downcast_ref::<AtomicBool>() {
        flag.store(true, Ordering::Release);
    }
    wake_main();
}

fn on_console(status: SciStatus, context: EventContext) {
    ConsoleReady::on_event(status, context);
    wake_main();
}

fn load_config() -> Result<DemoConfig, String> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(DemoConfig::default());
    };
    let text = std::fs::read_to_string(&path).map_err(|err| format!("{}: {}", path, err))?;
    DemoConfig::parse(&text).map_err(|err| format!("{}: {}", path, err))
}

fn main() -> ExitCode {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("demo-hal: {}", err);
            return ExitCode::FAILURE;
        }
    };
    let board = match config.pins.apply(posix::BOARD, pins::parse) {
        Ok(board) => board,
        Err(err) => {
            eprintln!("demo-hal: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let gpio: &'static Controller = Box::leak(Box::new(GpioController::new(
        PosixGpio::terminal(),
        config.gpio,
    )));
    board.setup(gpio);

    let input = ConsoleInput::new();
    let mut console = StdoutConsole::stdout(input.clone());
    if let Err(err) = console.configure(&config.console) {
        eprintln!("demo-hal: console: {}", err);
        return ExitCode::FAILURE;
    }
    console.set_event_handler(Some(on_console), &CONSOLE_READY);

    if let Err(err) = KEY4_PRESSES.attach(gpio, board.key4) {
        eprintln!("demo-hal: key 4 events unavailable: {}", err);
    }
    if let Err(err) = keyboard::spawn(gpio, Some(input)) {
        eprintln!("demo-hal: cannot read the keyboard: {}", err);
        return ExitCode::FAILURE;
    }

    let _ = MAIN.set(thread::current());
    let mut tick = ThreadTick::new(&TICK);
    tick.start(on_tick, &NEW_TICK, config.tick_period_us);

    let mut rgb = RgbSequencer::new(config.flash_divisor);
    let mut toggle = KeyToggle::new();
    let mut divisor = 0;
    let mut reported = 0;

    loop {
        let ticked = NEW_TICK.swap(false, Ordering::AcqRel);
        if CONSOLE_READY.take() {
            apps::console::poll(gpio, &board, &mut console);
        }
        if !ticked {
            thread::park();
            continue;
        }

        if let Err(err) = rgb.tick(gpio, &board.rgb, &mut console) {
            eprintln!("demo-hal: console: {}", err);
            return ExitCode::FAILURE;
        }

        divisor += 1;
        if divisor == config.key_divisor {
            divisor = 0;
            switch_led(gpio, board.key1, board.key2, board.led1);
            toggle.poll(gpio, board.key3, board.led2);
            follow_key(gpio, board.key4, board.led3);
        }

        let presses = KEY4_PRESSES.presses();
        if presses != reported {
            reported = presses;
            let message = format!("Key 4 pressed {} times\n", presses);
            if let Err(err) = console.send_all(message.as_bytes()) {
                eprintln!("demo-hal: console: {}", err);
                return ExitCode::FAILURE;
            }
        }
    }
}
