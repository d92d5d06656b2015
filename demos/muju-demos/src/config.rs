//! Demo configuration
//!
//! Read from an optional TOML file. Every key is optional:
//!
//! ```toml
//! tick_period_us = 1000
//! flash_divisor = 500
//! key_divisor = 150
//!
//! [gpio]
//! priority = 2
//!
//! [console]
//! baud_rate = 9600
//! parity = "even"
//!
//! [pins]
//! led1 = "GPIO3_4"
//! key4 = "none"
//! ```
//!
//! Pin overrides name a pin of the board's table, or `none` to remove it.

use core::fmt;

use muju_hal::sci::SciError;
use muju_hal::{GpioBit, GpioConfig, SciLine};
use serde::Deserialize;

use crate::board::Board;

/// Value of a pin override that removes the pin
pub const NO_PIN: &str = "none";

/// Demo settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// System tick period in microseconds
    pub tick_period_us: u32,
    /// Ticks between RGB sequencer steps
    pub flash_divisor: u32,
    /// Ticks between key scans
    pub key_divisor: u32,
    pub gpio: GpioConfig,
    pub console: SciLine,
    pub pins: PinOverrides,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tick_period_us: 1_000,
            flash_divisor: 500,
            key_divisor: 150,
            gpio: GpioConfig::DEFAULT,
            console: SciLine::DEFAULT,
            pins: PinOverrides::default(),
        }
    }
}

/// Board pins replaced by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinOverrides {
    pub red: Option<String>,
    pub green: Option<String>,
    pub blue: Option<String>,
    pub led1: Option<String>,
    pub led2: Option<String>,
    pub led3: Option<String>,
    pub key1: Option<String>,
    pub key2: Option<String>,
    pub key3: Option<String>,
    pub key4: Option<String>,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Malformed TOML or unknown key, near `line` (0 if unknown)
    Toml { line: usize },
    /// Tick period of zero
    ZeroTickPeriod,
    /// Divisor of zero
    ZeroDivisor { field: &'static str },
    /// Pin override naming a pin the board does not have
    UnknownPin { field: &'static str },
    /// Console settings rejected
    Console(SciError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Toml { line: 0 } => write!(f, "invalid TOML"),
            ConfigError::Toml { line } => write!(f, "invalid TOML near line {}", line),
            ConfigError::ZeroTickPeriod => write!(f, "tick_period_us must not be zero"),
            ConfigError::ZeroDivisor { field } => write!(f, "{} must not be zero", field),
            ConfigError::UnknownPin { field } => write!(f, "pins.{} names an unknown pin", field),
            ConfigError::Console(err) => write!(f, "console: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<SciError> for ConfigError {
    fn from(err: SciError) -> Self {
        ConfigError::Console(err)
    }
}

impl DemoConfig {
    /// Parse and validate a TOML document
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: DemoConfig = toml::from_str(text).map_err(|err| {
            let line = err
                .span()
                .map(|span| text[..span.start.min(text.len())].matches('\n').count() + 1)
                .unwrap_or(0);
            ConfigError::Toml { line }
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_us == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.flash_divisor == 0 {
            return Err(ConfigError::ZeroDivisor {
                field: "flash_divisor",
            });
        }
        if self.key_divisor == 0 {
            return Err(ConfigError::ZeroDivisor {
                field: "key_divisor",
            });
        }
        self.console.validate()?;
        Ok(())
    }
}

impl PinOverrides {
    /// Replace the pins of `board` named here, looking names up with `parse`
    pub fn apply<M: Sync + 'static>(
        &self,
        board: Board<M>,
        parse: fn(&str) -> Option<GpioBit<M>>,
    ) -> Result<Board<M>, ConfigError> {
        let mut board = board;
        let slots = [
            ("red", &self.red, &mut board.rgb.red),
            ("green", &self.green, &mut board.rgb.green),
            ("blue", &self.blue, &mut board.rgb.blue),
            ("led1", &self.led1, &mut board.led1),
            ("led2", &self.led2, &mut board.led2),
            ("led3", &self.led3, &mut board.led3),
            ("key1", &self.key1, &mut board.key1),
            ("key2", &self.key2, &mut board.key2),
            ("key3", &self.key3, &mut board.key3),
            ("key4", &self.key4, &mut board.key4),
        ];
        for (field, name, pin) in slots {
            let Some(name) = name else {
                continue;
            };
            *pin = if name.trim().eq_ignore_ascii_case(NO_PIN) {
                None
            } else {
                Some(parse(name).ok_or(ConfigError::UnknownPin { field })?)
            };
        }
        Ok(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::posix::BOARD;
    use muju_hal::gpio::same_pin;
    use muju_hal::sci::Parity;
    use muju_hal_posix::pins;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = DemoConfig::parse("").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.tick_period_us, 1_000);
        assert_eq!(config.flash_divisor, 500);
        assert_eq!(config.key_divisor, 150);
    }

    #[test]
    fn test_full_file() {
        let config = DemoConfig::parse(
            r#"
            tick_period_us = 500
            flash_divisor = 10

            [gpio]
            priority = 3

            [console]
            baud_rate = 9600
            parity = "even"

            [pins]
            led1 = "gpio3_4"
            key4 = "none"
            "#,
        )
        .unwrap();

        assert_eq!(config.tick_period_us, 500);
        assert_eq!(config.flash_divisor, 10);
        assert_eq!(config.key_divisor, 150);
        assert_eq!(config.gpio.priority, 3);
        assert_eq!(config.console.baud_rate, 9600);
        assert_eq!(config.console.data_bits, 8);
        assert_eq!(config.console.parity, Parity::Even);

        let board = config.pins.apply(BOARD, pins::parse).unwrap();
        assert!(same_pin(board.led1.unwrap(), &pins::GPIO3_4));
        assert!(board.key4.is_none());
        assert!(same_pin(board.key1.unwrap(), &pins::GPIO0_0));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            DemoConfig::parse("tick_period_us = 0"),
            Err(ConfigError::ZeroTickPeriod)
        );
        assert_eq!(
            DemoConfig::parse("key_divisor = 0"),
            Err(ConfigError::ZeroDivisor {
                field: "key_divisor"
            })
        );
        assert_eq!(
            DemoConfig::parse("[console]\ndata_bits = 4"),
            Err(ConfigError::Console(SciError::InvalidDataBits(4)))
        );
        assert_eq!(
            DemoConfig::parse("\n\nflash_divisor = = 3"),
            Err(ConfigError::Toml { line: 3 })
        );
        assert!(matches!(
            DemoConfig::parse("unknown = 1"),
            Err(ConfigError::Toml { .. })
        ));
        assert!(matches!(
            DemoConfig::parse("flash_divisor = \"x\""),
            Err(ConfigError::Toml { .. })
        ));
    }

    #[test]
    fn test_unknown_pin() {
        let overrides = PinOverrides {
            red: Some("PA0".into()),
            ..PinOverrides::default()
        };
        assert_eq!(
            overrides.apply(BOARD, pins::parse).err(),
            Some(ConfigError::UnknownPin { field: "red" })
        );
    }
}
