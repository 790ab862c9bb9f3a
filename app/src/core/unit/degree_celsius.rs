use std::fmt::Display;

use derive_more::derive::AsRef;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, AsRef, Serialize, Deserialize)]
pub struct DegreeCelsius(pub f64);

impl DegreeCelsius {
    pub fn clamp(self, min: DegreeCelsius, max: DegreeCelsius) -> Self {
        DegreeCelsius(self.0.clamp(min.0, max.0))
    }

    /// Rounds to the nearest multiple of `step`.
    pub fn round_to_step(self, step: f64) -> Self {
        DegreeCelsius((self.0 / step).round() * step)
    }
}

impl From<f64> for DegreeCelsius {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl From<DegreeCelsius> for f64 {
    fn from(value: DegreeCelsius) -> Self {
        value.0
    }
}

impl Display for DegreeCelsius {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} °C", self.0)
    }
}
