//! Chip pin configuration
//!
//! GPIO descriptors only cover terminals used as GPIO. Serial lines, timer
//! outputs and other peripheral functions are configured on the chip pin
//! itself: which function the multiplexer routes to it, and which pull
//! resistors are enabled.

/// Pull resistors of a chip pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// No resistor, the pin floats
    #[default]
    None,
    /// Pull-up only
    Up,
    /// Pull-down only
    Down,
    /// Both resistors (bus keeper on parts that support it)
    Both,
}

impl Pull {
    pub const fn new(up: bool, down: bool) -> Self {
        match (up, down) {
            (false, false) => Pull::None,
            (true, false) => Pull::Up,
            (false, true) => Pull::Down,
            (true, true) => Pull::Both,
        }
    }

    /// Pull-up enabled
    pub const fn up(self) -> bool {
        matches!(self, Pull::Up | Pull::Both)
    }

    /// Pull-down enabled
    pub const fn down(self) -> bool {
        matches!(self, Pull::Down | Pull::Both)
    }

    /// Same pull-down, pull-up as given
    pub const fn with_up(self, enable: bool) -> Self {
        Self::new(enable, self.down())
    }

    /// Same pull-up, pull-down as given
    pub const fn with_down(self, enable: bool) -> Self {
        Self::new(self.up(), enable)
    }
}

/// Chip pin multiplexer and pull resistor control of one silicon family
pub trait ChipPins {
    /// Physical pin identifier
    type ChipPin: Copy;

    /// Route `function` to `pin` and set its pull resistors
    fn set_function(&mut self, pin: Self::ChipPin, function: u8, pull: Pull);

    /// Pull resistors currently enabled on `pin`
    fn pull(&self, pin: Self::ChipPin) -> Pull;

    /// Change the pull resistors of `pin`, keeping its function
    fn set_pull(&mut self, pin: Self::ChipPin, pull: Pull);
}
