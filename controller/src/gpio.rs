//! Sysfs actuator layer: a PWM channel for the fan, a GPIO pin for the
//! relay. Both are driven idempotently every tick and are left switched
//! off when the controller stops driving them.

use std::{fs, path::PathBuf, thread, time::Duration};

use anyhow::Context;
use solair_common::{FanPwmConfig, RelayConfig};

const NANOS_PER_SEC: u64 = 1_000_000_000;

// The kernel needs a moment to populate a freshly exported channel.
const EXPORT_SETTLE: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct PwmFan {
    channel_dir: PathBuf,
    period_ns: u64,
}

impl PwmFan {
    pub fn open(config: &FanPwmConfig) -> anyhow::Result<Self> {
        let chip_dir = PathBuf::from(format!("/sys/class/pwm/pwmchip{}", config.chip));
        let channel_dir = chip_dir.join(format!("pwm{}", config.channel));

        if !channel_dir.exists() {
            fs::write(chip_dir.join("export"), config.channel.to_string()).with_context(|| {
                format!(
                    "failed to export pwm channel {} on {}",
                    config.channel,
                    chip_dir.display()
                )
            })?;
            thread::sleep(EXPORT_SETTLE);
        }

        let period_ns = NANOS_PER_SEC / u64::from(config.frequency_hz.max(1));
        fs::write(channel_dir.join("period"), period_ns.to_string())
            .context("failed to set pwm period")?;

        let fan = Self {
            channel_dir,
            period_ns,
        };
        fan.set_duty(0.0)?;
        fs::write(fan.channel_dir.join("enable"), "1").context("failed to enable pwm output")?;
        Ok(fan)
    }

    /// Applies a duty cycle in percent. Safe to call every tick.
    pub fn set_duty(&self, percent: f32) -> anyhow::Result<()> {
        let clamped = percent.clamp(0.0, 100.0);
        let duty_ns = (self.period_ns as f64 * f64::from(clamped) / 100.0) as u64;
        fs::write(self.channel_dir.join("duty_cycle"), duty_ns.to_string())
            .with_context(|| format!("failed to set pwm duty cycle to {clamped:.1}%"))?;
        Ok(())
    }
}

#[derive(Debug)]
pub struct RelayPin {
    value_path: PathBuf,
}

impl RelayPin {
    pub fn open(config: &RelayConfig) -> anyhow::Result<Self> {
        let gpio_dir = PathBuf::from(format!("/sys/class/gpio/gpio{}", config.gpio));

        if !gpio_dir.exists() {
            fs::write("/sys/class/gpio/export", config.gpio.to_string())
                .with_context(|| format!("failed to export gpio {}", config.gpio))?;
            thread::sleep(EXPORT_SETTLE);
        }

        fs::write(gpio_dir.join("direction"), "out")
            .with_context(|| format!("failed to set gpio {} as output", config.gpio))?;

        let pin = Self {
            value_path: gpio_dir.join("value"),
        };
        pin.set(false)?;
        Ok(pin)
    }

    /// Drives the relay coil. Safe to call every tick.
    pub fn set(&self, on: bool) -> anyhow::Result<()> {
        fs::write(&self.value_path, if on { "1" } else { "0" })
            .context("failed to drive relay gpio")?;
        Ok(())
    }
}

/// The two physical outputs, opened together and released together.
#[derive(Debug)]
pub struct Actuators {
    pub fan: PwmFan,
    pub relay: RelayPin,
}

impl Actuators {
    pub fn open(fan: &FanPwmConfig, relay: &RelayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            fan: PwmFan::open(fan)?,
            relay: RelayPin::open(relay)?,
        })
    }

    /// Safe state for process exit: fan stopped, relay released.
    pub fn shutdown(&self) -> anyhow::Result<()> {
        self.fan.set_duty(0.0)?;
        self.relay.set(false)
    }
}
