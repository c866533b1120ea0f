use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Counter resolution selected when a measurement starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Bit-cell granularity (clock / 8).
    Fine,
    /// Phase granularity (clock / 64).
    Coarse,
}

/// Reference clock the device runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Speed {
    /// 16 MHz.
    #[default]
    Full,
    /// 8 MHz.
    Half,
}

impl Speed {
    pub fn clock_hz(self) -> u64 {
        match self {
            Speed::Full => 16_000_000,
            Speed::Half => 8_000_000,
        }
    }

    /// Length of one counter tick at `resolution`, in nanoseconds.
    pub fn tick_ns(self, resolution: Resolution) -> u64 {
        let prescale = match resolution {
            Resolution::Fine => 8u64,
            Resolution::Coarse => 64u64,
        };
        prescale * 1_000_000_000 / self.clock_hz()
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speed::Full => f.write_str("full"),
            Speed::Half => f.write_str("half"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown bus speed {0:?} (expected \"full\" or \"half\")")]
pub struct SpeedParseError(pub String);

impl FromStr for Speed {
    type Err = SpeedParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "16mhz" => Ok(Speed::Full),
            "half" | "8mhz" => Ok(Speed::Half),
            _ => Err(SpeedParseError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_periods_match_prescalers() {
        assert_eq!(Speed::Full.tick_ns(Resolution::Fine), 500);
        assert_eq!(Speed::Full.tick_ns(Resolution::Coarse), 4_000);
        assert_eq!(Speed::Half.tick_ns(Resolution::Fine), 1_000);
        assert_eq!(Speed::Half.tick_ns(Resolution::Coarse), 8_000);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("FULL".parse::<Speed>(), Ok(Speed::Full));
        assert_eq!(" half ".parse::<Speed>(), Ok(Speed::Half));
        assert_eq!("8mhz".parse::<Speed>(), Ok(Speed::Half));
        assert!("quarter".parse::<Speed>().is_err());
    }
}
