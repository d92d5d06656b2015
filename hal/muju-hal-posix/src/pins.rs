//! Emulated GPIO terminals
//!
//! Four 8-bit ports. Nothing needs multiplexing, so descriptors carry no
//! payload.

muju_hal::pin_table! {
    mux: ();
    GPIO0_0 = (0, 0) => ();
    GPIO0_1 = (0, 1) => ();
    GPIO0_2 = (0, 2) => ();
    GPIO0_3 = (0, 3) => ();
    GPIO0_4 = (0, 4) => ();
    GPIO0_5 = (0, 5) => ();
    GPIO0_6 = (0, 6) => ();
    GPIO0_7 = (0, 7) => ();

    GPIO1_0 = (1, 0) => ();
    GPIO1_1 = (1, 1) => ();
    GPIO1_2 = (1, 2) => ();
    GPIO1_3 = (1, 3) => ();
    GPIO1_4 = (1, 4) => ();
    GPIO1_5 = (1, 5) => ();
    GPIO1_6 = (1, 6) => ();
    GPIO1_7 = (1, 7) => ();

    GPIO2_0 = (2, 0) => ();
    GPIO2_1 = (2, 1) => ();
    GPIO2_2 = (2, 2) => ();
    GPIO2_3 = (2, 3) => ();
    GPIO2_4 = (2, 4) => ();
    GPIO2_5 = (2, 5) => ();
    GPIO2_6 = (2, 6) => ();
    GPIO2_7 = (2, 7) => ();

    GPIO3_0 = (3, 0) => ();
    GPIO3_1 = (3, 1) => ();
    GPIO3_2 = (3, 2) => ();
    GPIO3_3 = (3, 3) => ();
    GPIO3_4 = (3, 4) => ();
    GPIO3_5 = (3, 5) => ();
    GPIO3_6 = (3, 6) => ();
    GPIO3_7 = (3, 7) => ();
}

/// Number of emulated ports
pub const PORTS: usize = 4;
