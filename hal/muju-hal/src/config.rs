//! Runtime configuration for the HAL

/// GPIO controller settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(default))]
pub struct GpioConfig {
    /// Interrupt controller priority given to armed channels
    ///
    /// Logical priority (0 is the most urgent); backends shift it into
    /// the implemented priority bits of their NVIC.
    pub priority: u8,
}

impl GpioConfig {
    /// Settings used when nothing else is specified
    pub const DEFAULT: Self = Self { priority: 0 };
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
