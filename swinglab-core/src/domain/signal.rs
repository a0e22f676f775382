//! Directional signal in {-1, 0, +1}.

use serde::{Deserialize, Serialize};

/// Desired direction for a bar, before the one-bar execution lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Signal {
    Short,
    #[default]
    Flat,
    Long,
}

impl Signal {
    /// Map any numeric value to a signal by its sign. NaN maps to `Flat`.
    pub fn from_value(value: f64) -> Self {
        if value > 0.0 {
            Signal::Long
        } else if value < 0.0 {
            Signal::Short
        } else {
            Signal::Flat
        }
    }

    pub fn value(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    /// Multiplier applied to a share magnitude.
    pub fn direction(self) -> f64 {
        f64::from(self.value())
    }

    pub fn is_flat(self) -> bool {
        self == Signal::Flat
    }

    /// True when this signal points against a held position of `shares`.
    pub fn opposes(self, shares: f64) -> bool {
        (shares > 0.0 && self == Signal::Short) || (shares < 0.0 && self == Signal::Long)
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> Self {
        signal.value()
    }
}

impl TryFrom<i8> for Signal {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Short),
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            other => Err(format!("signal must be -1, 0 or 1, got {other}")),
        }
    }
}
