use serde::{Deserialize, Serialize};

use crate::types::ControlMode;

/// Tunables of the control engine itself. All durations are wall-clock
/// seconds; the tick interval converts them to tick counts where needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    pub mode: ControlMode,
    /// Hysteresis span in °C over which fan speed ramps from 0 to 100%.
    pub span_c: f32,
    pub tick_seconds: f32,
    /// Collector temperature above which the fan is forced to full speed.
    pub overheat_c: f32,
    /// Keep only the overheat guard running, everything else stays off.
    pub off: bool,
    /// Number of duty-cycle requests averaged by the fan smoother.
    pub fan_history: usize,
    /// Minimum time between relay switches.
    pub relay_hold_seconds: f32,
    pub cooling_test_seconds: f32,
    pub cooling_rest_seconds: f32,
    /// Ramp length of the day-to-night target transition.
    pub night_transition_seconds: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            mode: ControlMode::Summer,
            span_c: 1.0,
            tick_seconds: 30.0,
            overheat_c: 50.0,
            off: false,
            fan_history: 3,
            relay_hold_seconds: 300.0,
            cooling_test_seconds: 660.0,
            cooling_rest_seconds: 2920.0,
            night_transition_seconds: 7200.0,
        }
    }
}

impl ControlConfig {
    pub fn sanitize(&mut self) {
        self.span_c = self.span_c.clamp(0.1, 10.0);
        self.tick_seconds = self.tick_seconds.clamp(1.0, 3600.0);
        self.overheat_c = self.overheat_c.clamp(30.0, 95.0);
        self.fan_history = self.fan_history.clamp(1, 16);
        self.relay_hold_seconds = self.relay_hold_seconds.clamp(0.0, 3600.0);
        self.cooling_test_seconds = self.cooling_test_seconds.clamp(60.0, 7200.0);
        self.cooling_rest_seconds = self.cooling_rest_seconds.clamp(60.0, 86_400.0);
        self.night_transition_seconds = self.night_transition_seconds.clamp(60.0, 21_600.0);
    }
}

/// 1-wire slave ids of the three probes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorIds {
    pub house: String,
    pub collector: String,
    pub outside: String,
}

impl Default for SensorIds {
    fn default() -> Self {
        Self {
            house: "28-02149245b4f2".to_string(),
            collector: "28-021492459ef5".to_string(),
            outside: "28-02149245af81".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FanPwmConfig {
    pub chip: u32,
    pub channel: u32,
    pub frequency_hz: u32,
}

impl Default for FanPwmConfig {
    fn default() -> Self {
        Self {
            chip: 0,
            channel: 0,
            frequency_hz: 20,
        }
    }
}

impl FanPwmConfig {
    pub fn sanitize(&mut self) {
        self.frequency_hz = self.frequency_hz.clamp(1, 10_000);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub gpio: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { gpio: 13 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub sensors: SensorIds,
    #[serde(default)]
    pub fan: FanPwmConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "Europe/Berlin".to_string()
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            sensors: SensorIds::default(),
            fan: FanPwmConfig::default(),
            relay: RelayConfig::default(),
            timezone: default_timezone(),
        }
    }
}

impl RuntimeConfig {
    pub fn sanitize(&mut self) {
        self.control.sanitize();
        self.fan.sanitize();
    }
}
