//! GPIO-capable terminals of the LPC43xx
//!
//! Each descriptor names a terminal by its GPIO group and bit (the numbers
//! used by the GPIO and pin-interrupt blocks) and carries the SCU pin it
//! lives on, so the multiplexer can be switched to the GPIO function.
//!
//! Only terminals bonded out on the LBGA144/LQFP144 packages of the
//! EDU-CIAA-NXP are listed.

/// Chip pin `Pport_pin` as seen by the SCU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScuPin {
    /// SCU pin group (the `n` of `Pn_m`)
    pub port: u8,
    /// Pin within the SCU group (the `m` of `Pn_m`)
    pub pin: u8,
}

impl ScuPin {
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }
}

/// SCU location and GPIO function number of a terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScuMux {
    /// SCU pin group (the `n` of `Pn_m`)
    pub port: u8,
    /// Pin within the SCU group (the `m` of `Pn_m`)
    pub pin: u8,
    /// SCU function that routes the pin to its GPIO
    pub function: u8,
}

impl ScuMux {
    pub const fn new(port: u8, pin: u8, function: u8) -> Self {
        Self {
            port,
            pin,
            function,
        }
    }

    /// Chip pin carrying the terminal
    pub const fn scu_pin(&self) -> ScuPin {
        ScuPin::new(self.port, self.pin)
    }
}

muju_hal::pin_table! {
    mux: ScuMux;
    // SCU group P0
    GPIO0_0 = (0, 0) => ScuMux::new(0, 0, 0);
    GPIO0_1 = (0, 1) => ScuMux::new(0, 1, 0);

    // SCU group P1
    GPIO0_4 = (0, 4) => ScuMux::new(1, 0, 0);
    GPIO0_8 = (0, 8) => ScuMux::new(1, 1, 0);
    GPIO0_9 = (0, 9) => ScuMux::new(1, 2, 0);
    GPIO0_10 = (0, 10) => ScuMux::new(1, 3, 0);
    GPIO0_11 = (0, 11) => ScuMux::new(1, 4, 0);
    GPIO1_8 = (1, 8) => ScuMux::new(1, 5, 0);
    GPIO1_9 = (1, 9) => ScuMux::new(1, 6, 0);
    GPIO0_2 = (0, 2) => ScuMux::new(1, 15, 0);
    GPIO0_3 = (0, 3) => ScuMux::new(1, 16, 0);
    GPIO0_12 = (0, 12) => ScuMux::new(1, 17, 0);
    GPIO0_13 = (0, 13) => ScuMux::new(1, 18, 0);
    GPIO0_15 = (0, 15) => ScuMux::new(1, 20, 0);

    // SCU group P2
    GPIO5_0 = (5, 0) => ScuMux::new(2, 0, 4);
    GPIO5_1 = (5, 1) => ScuMux::new(2, 1, 4);
    GPIO5_2 = (5, 2) => ScuMux::new(2, 2, 4);
    GPIO5_3 = (5, 3) => ScuMux::new(2, 3, 4);
    GPIO5_4 = (5, 4) => ScuMux::new(2, 4, 4);
    GPIO0_7 = (0, 7) => ScuMux::new(2, 7, 0);
    GPIO0_14 = (0, 14) => ScuMux::new(2, 10, 0);
    GPIO1_11 = (1, 11) => ScuMux::new(2, 11, 0);
    GPIO1_12 = (1, 12) => ScuMux::new(2, 12, 0);

    // SCU group P3
    GPIO5_8 = (5, 8) => ScuMux::new(3, 1, 4);
    GPIO5_9 = (5, 9) => ScuMux::new(3, 2, 4);

    // SCU group P4
    GPIO2_0 = (2, 0) => ScuMux::new(4, 0, 0);
    GPIO2_1 = (2, 1) => ScuMux::new(4, 1, 0);
    GPIO2_2 = (2, 2) => ScuMux::new(4, 2, 0);
    GPIO2_3 = (2, 3) => ScuMux::new(4, 3, 0);
    GPIO2_4 = (2, 4) => ScuMux::new(4, 4, 0);
    GPIO2_5 = (2, 5) => ScuMux::new(4, 5, 0);
    GPIO2_6 = (2, 6) => ScuMux::new(4, 6, 0);
    GPIO5_12 = (5, 12) => ScuMux::new(4, 8, 4);
    GPIO5_13 = (5, 13) => ScuMux::new(4, 9, 4);
    GPIO5_14 = (5, 14) => ScuMux::new(4, 10, 4);

    // SCU group P6
    GPIO3_0 = (3, 0) => ScuMux::new(6, 1, 0);
    GPIO3_1 = (3, 1) => ScuMux::new(6, 2, 0);
    GPIO3_2 = (3, 2) => ScuMux::new(6, 3, 0);
    GPIO3_3 = (3, 3) => ScuMux::new(6, 4, 0);
    GPIO3_4 = (3, 4) => ScuMux::new(6, 5, 0);
    GPIO0_5 = (0, 5) => ScuMux::new(6, 6, 0);
    GPIO5_15 = (5, 15) => ScuMux::new(6, 7, 4);
    GPIO5_16 = (5, 16) => ScuMux::new(6, 8, 4);
    GPIO3_5 = (3, 5) => ScuMux::new(6, 9, 0);
    GPIO3_6 = (3, 6) => ScuMux::new(6, 10, 0);
    GPIO3_7 = (3, 7) => ScuMux::new(6, 11, 0);
    GPIO2_8 = (2, 8) => ScuMux::new(6, 12, 0);

    // SCU group P7
    GPIO2_12 = (2, 12) => ScuMux::new(7, 4, 0);
    GPIO2_13 = (2, 13) => ScuMux::new(7, 5, 0);
    GPIO2_14 = (2, 14) => ScuMux::new(7, 6, 0);
    GPIO2_15 = (2, 15) => ScuMux::new(7, 7, 0);

    // SCU group P9
    GPIO5_18 = (5, 18) => ScuMux::new(9, 5, 4);
    GPIO4_11 = (4, 11) => ScuMux::new(9, 6, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use muju_hal::gpio::same_pin;

    #[test]
    fn test_board_terminals() {
        // RGB led and TEC_1 on the EDU-CIAA-NXP
        assert_eq!(*GPIO5_0.mux(), ScuMux::new(2, 0, 4));
        assert_eq!(*GPIO0_4.mux(), ScuMux::new(1, 0, 0));
        assert_eq!(*GPIO4_11.mux(), ScuMux::new(9, 6, 0));
        assert_eq!(GPIO1_12.mux().scu_pin(), ScuPin::new(2, 12));
    }

    #[test]
    fn test_unique_logical_numbers() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert!((a.gpio(), a.bit()) != (b.gpio(), b.bit()));
                assert!(a.mux() != b.mux());
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert!(same_pin(find(1, 12).unwrap(), &GPIO1_12));
        assert!(same_pin(parse("gpio3_7").unwrap(), &GPIO3_7));
        assert!(find(6, 0).is_none());
    }
}
