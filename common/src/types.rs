use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Printed in place of the outside temperature when no reading exists.
/// Deliberately out of range so log post-processing can filter it.
pub const OUTSIDE_SENTINEL_C: f32 = -30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    Summer,
    Heating,
}

impl ControlMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Summer => "summer",
            Self::Heating => "heating",
        }
    }

    pub fn is_summer(self) -> bool {
        self == Self::Summer
    }
}

/// One tick's sensor readings. `outside` is genuinely optional; a missing
/// reading must never be collapsed to 0.0 °C.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub house: f32,
    pub collector: f32,
    pub outside: Option<f32>,
}

/// One status line per tick, append-friendly for log redirection.
///
/// Fields are space separated: date, time, house °C, collector °C, fan
/// fraction, outside °C (or the sentinel), relay state (-1 when relay logic
/// was suppressed this tick), target °C.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    pub timestamp: NaiveDateTime,
    pub house: f32,
    pub collector: f32,
    pub fan_fraction: f32,
    pub outside: Option<f32>,
    pub relay: Option<bool>,
    pub target: f32,
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let outside = self.outside.unwrap_or(OUTSIDE_SENTINEL_C);
        let relay = match self.relay {
            None => -1,
            Some(false) => 0,
            Some(true) => 1,
        };
        write!(
            f,
            "{} {:5.1} {:5.1} {:4.2} {:5.1} {} {:5.1}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.house,
            self.collector,
            self.fan_fraction,
            outside,
            relay,
            self.target,
        )
    }
}
