use core::fmt;

/// Error returned when configuring a [`FlashSort`](struct.FlashSort.html)
/// with an invalid value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConfigError {
    /// The classification ratio is not in the open interval `(0, 1)`.
    InvalidClassificationRatio(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidClassificationRatio(ratio) => write!(
                f,
                "classification ratio must be between 0 and 1 (exclusive), got {}",
                ratio
            ),
        }
    }
}

impl core::error::Error for ConfigError {}
