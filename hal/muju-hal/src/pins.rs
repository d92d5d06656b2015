//! Descriptor table generator
//!
//! Backend crates declare their terminals once with [`pin_table!`]; the
//! macro emits one `static` per pin plus lookups for config-driven code.

/// Declare the descriptor statics of a backend
///
/// Usage:
/// ```ignore
/// muju_hal::pin_table! {
///     mux: ChipPin;
///     /// Bit 0 on GPIO A
///     PA0 = (0, 0) => ChipPin::new(0, 0);
/// }
/// ```
///
/// Besides the statics this emits:
/// - `ALL` - every descriptor, in declaration order
/// - `NAMES` - the identifier of each entry of `ALL`
/// - `find(gpio, bit)` - lookup by logical numbers
/// - `parse(name)` - lookup by identifier, ignoring case
/// - `name_of(pin)` - identifier of a descriptor from this table
#[macro_export]
macro_rules! pin_table {
    (
        mux: $mux:ty;
        $( $(#[$attr:meta])* $name:ident = ($gpio:literal, $bit:literal) => $payload:expr; )*
    ) => {
        $(
            $(#[$attr])*
            pub static $name: $crate::gpio::PinDescriptor<$mux> =
                $crate::gpio::PinDescriptor::new($gpio, $bit, $payload);
        )*

        /// Every pin of the table, in declaration order
        pub static ALL: &[$crate::gpio::GpioBit<$mux>] = &[$( &$name ),*];

        /// Identifier of each entry of [`ALL`]
        pub static NAMES: &[&str] = &[$( stringify!($name) ),*];

        /// Pin with logical group `gpio` and bit `bit`
        pub fn find(gpio: u8, bit: u8) -> Option<$crate::gpio::GpioBit<$mux>> {
            ALL.iter()
                .copied()
                .find(|pin| pin.gpio() == gpio && pin.bit() == bit)
        }

        /// Pin named `name`
        pub fn parse(name: &str) -> Option<$crate::gpio::GpioBit<$mux>> {
            let name = name.trim();
            NAMES
                .iter()
                .zip(ALL.iter())
                .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
                .map(|(_, pin)| *pin)
        }

        /// Identifier of `pin`
        pub fn name_of(pin: $crate::gpio::GpioBit<$mux>) -> Option<&'static str> {
            ALL.iter()
                .position(|candidate| $crate::gpio::same_pin(*candidate, pin))
                .and_then(|index| NAMES.get(index).copied())
        }
    };
}
