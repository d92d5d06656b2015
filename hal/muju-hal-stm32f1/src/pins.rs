//! GPIO-capable terminals of the STM32F103 (Blue Pill, LQFP48)
//!
//! The logical group is the port (A = 0) and the bit is the pin number,
//! which is also the EXTI line the terminal can drive.

/// Physical port and pin of a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipPin {
    /// Port index, 0 for `GPIOA`
    pub port: u8,
    /// Pin within the port (0-15)
    pub pin: u8,
}

impl ChipPin {
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }

    /// Port letter, for display
    pub const fn port_letter(&self) -> char {
        (b'A' + self.port) as char
    }
}

muju_hal::pin_table! {
    mux: ChipPin;
    PA0 = (0, 0) => ChipPin::new(0, 0);
    PA1 = (0, 1) => ChipPin::new(0, 1);
    PA2 = (0, 2) => ChipPin::new(0, 2);
    PA3 = (0, 3) => ChipPin::new(0, 3);
    PA4 = (0, 4) => ChipPin::new(0, 4);
    PA5 = (0, 5) => ChipPin::new(0, 5);
    PA6 = (0, 6) => ChipPin::new(0, 6);
    PA7 = (0, 7) => ChipPin::new(0, 7);
    PA8 = (0, 8) => ChipPin::new(0, 8);
    PA9 = (0, 9) => ChipPin::new(0, 9);
    PA10 = (0, 10) => ChipPin::new(0, 10);
    PA11 = (0, 11) => ChipPin::new(0, 11);
    PA12 = (0, 12) => ChipPin::new(0, 12);
    PA13 = (0, 13) => ChipPin::new(0, 13);
    PA14 = (0, 14) => ChipPin::new(0, 14);
    PA15 = (0, 15) => ChipPin::new(0, 15);

    PB0 = (1, 0) => ChipPin::new(1, 0);
    PB1 = (1, 1) => ChipPin::new(1, 1);
    PB2 = (1, 2) => ChipPin::new(1, 2);
    PB3 = (1, 3) => ChipPin::new(1, 3);
    PB4 = (1, 4) => ChipPin::new(1, 4);
    PB5 = (1, 5) => ChipPin::new(1, 5);
    PB6 = (1, 6) => ChipPin::new(1, 6);
    PB7 = (1, 7) => ChipPin::new(1, 7);
    PB8 = (1, 8) => ChipPin::new(1, 8);
    PB9 = (1, 9) => ChipPin::new(1, 9);
    PB10 = (1, 10) => ChipPin::new(1, 10);
    PB11 = (1, 11) => ChipPin::new(1, 11);
    PB12 = (1, 12) => ChipPin::new(1, 12);
    PB13 = (1, 13) => ChipPin::new(1, 13);
    PB14 = (1, 14) => ChipPin::new(1, 14);
    PB15 = (1, 15) => ChipPin::new(1, 15);

    PC13 = (2, 13) => ChipPin::new(2, 13);
    PC14 = (2, 14) => ChipPin::new(2, 14);
    PC15 = (2, 15) => ChipPin::new(2, 15);

    PD0 = (3, 0) => ChipPin::new(3, 0);
    PD1 = (3, 1) => ChipPin::new(3, 1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use muju_hal::gpio::same_pin;

    #[test]
    fn test_table() {
        assert_eq!(ALL.len(), 37);
        assert_eq!(*PC13.mux(), ChipPin::new(2, 13));
        assert_eq!(PC13.mux().port_letter(), 'C');
        for pin in ALL {
            assert_eq!(pin.gpio(), pin.mux().port);
            assert_eq!(pin.bit(), pin.mux().pin);
        }
    }

    #[test]
    fn test_parse() {
        assert!(same_pin(parse("PA0").unwrap(), &PA0));
        assert!(same_pin(parse(" pb12").unwrap(), &PB12));
        // Not bonded out on the LQFP48
        assert!(parse("PC0").is_none());
        assert!(parse("PE1").is_none());
        assert!(same_pin(find(3, 1).unwrap(), &PD1));
    }
}
