//! Demo behaviours, written once against `GpioController` and run on any
//! board

pub mod console;
pub mod counter;
pub mod keys;
pub mod rgb;

pub use counter::KeyCounter;
pub use keys::{follow_key, switch_led, KeyToggle};
pub use rgb::{RgbSequencer, RgbStep};
