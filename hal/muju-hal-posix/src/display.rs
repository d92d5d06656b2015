//! ANSI rendering of the emulated ports
//!
//! One line per port, most significant bit first:
//!
//! ```text
//! GPIO 0: 7=1, 6=1, 5=0, 4=0, 3=1, 2=1, 1=1, 0=1
//! ```
//!
//! Changes repaint a single digit in place, green for high and red for low.

use std::io::{self, Write};

use crate::pins::PORTS;

/// Width of one `b=v, ` cell
const CELL: u16 = 5;
/// Column of the bit 0 digit
const LAST_COLUMN: u16 = 46;

const RED: u8 = 31;
const GREEN: u8 = 32;

/// Clear the screen and draw every port
pub fn draw(out: &mut impl Write, ports: &[u8; PORTS]) -> io::Result<()> {
    write!(out, "\x1b[2J\x1b[1;1H")?;
    for (gpio, value) in ports.iter().enumerate() {
        write!(out, "GPIO {}: ", gpio)?;
        for bit in (0..8).rev() {
            write!(out, "{}=\x1b[1;{}m{}\x1b[0m", bit, RED, (value >> bit) & 1)?;
            if bit > 0 {
                write!(out, ", ")?;
            }
        }
        writeln!(out)?;
    }
    // Leave the cursor above the table so console output scrolls below it
    write!(out, "\x1b[{}A\n", PORTS + 1)?;
    out.flush()
}

/// Repaint bit `bit` of port `gpio`
pub fn refresh(out: &mut impl Write, gpio: u8, bit: u8, level: bool) -> io::Result<()> {
    let row = gpio as u16 + 1;
    let column = LAST_COLUMN - CELL * bit as u16;
    let color = if level { GREEN } else { RED };
    write!(
        out,
        "\x1b[{};{}H\x1b[1;{}m{}\x1b[0m",
        row, column, color, level as u8
    )?;
    out.flush()
}
