use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use chrono::Utc;
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn};

use solair_common::{ControlEngine, ControlMode, Readings, RuntimeConfig, StatusRecord};

use crate::{gpio::Actuators, w1::W1Bus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Summer,
    Heating,
}

impl From<ModeArg> for ControlMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Summer => ControlMode::Summer,
            ModeArg::Heating => ControlMode::Heating,
        }
    }
}

/// Control a fan and relay for a solar air heater and night cooling.
#[derive(Debug, Parser)]
#[command(name = "solair", version)]
struct Cli {
    /// Season profile for the temperature targets.
    #[arg(long, value_enum)]
    mode: ModeArg,

    /// Hysteresis span for full fan speed in °C.
    #[arg(long)]
    span: Option<f32>,

    /// Seconds between control ticks.
    #[arg(long)]
    sleep: Option<f32>,

    /// Maximum tolerable collector temperature in °C.
    #[arg(long)]
    overheat: Option<f32>,

    /// Switch off and do only overheat control.
    #[arg(long)]
    off: bool,

    /// Path to a JSON runtime configuration file.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// IANA timezone for the day/night windows, e.g. Europe/Berlin.
    #[arg(long)]
    timezone: Option<String>,
}

pub async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut runtime = load_runtime_config(cli.config.as_deref())?;
    apply_cli(&mut runtime, &cli);
    runtime.sanitize();

    let tz: Tz = runtime
        .timezone
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown timezone {:?}", runtime.timezone))?;

    let bus = W1Bus::new();
    let names = bus.slave_names().context("could not enumerate w1 sensors")?;
    anyhow::ensure!(!names.is_empty(), "no w1 sensors found");
    info!("w1 sensors found: {names:?}");

    for (role, id) in [
        ("house", &runtime.sensors.house),
        ("collector", &runtime.sensors.collector),
    ] {
        anyhow::ensure!(
            names.iter().any(|name| name == id),
            "given {role} sensor {id} not found in system"
        );
    }
    if !names.iter().any(|name| name == &runtime.sensors.outside) {
        warn!(
            "outside sensor {} not present, night cooling runs degraded",
            runtime.sensors.outside
        );
    }

    let actuators =
        Actuators::open(&runtime.fan, &runtime.relay).context("failed to open fan and relay")?;
    let mut engine = ControlEngine::new(runtime.control.clone());

    let mut stdout = std::io::stdout();
    writeln!(
        stdout,
        "# overheat:{}°C mode:{} span:{}°C off:{}",
        runtime.control.overheat_c,
        runtime.control.mode.as_str(),
        runtime.control.span_c,
        runtime.control.off
    )?;
    writeln!(
        stdout,
        "#1: date 2: time 3: temp house (°C) 4: temp collector (°C) 5: fan 6: temp outside (°C) 7: relay 8: target (°C)"
    )?;
    stdout.flush()?;

    let mut interval =
        tokio::time::interval(Duration::from_secs_f32(runtime.control.tick_seconds));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let record = run_tick(&mut engine, &bus, &actuators, &runtime, tz)?;
                writeln!(stdout, "{record}")?;
                stdout.flush()?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down, releasing fan and relay");
                actuators.shutdown()?;
                return Ok(());
            }
        }
    }
}

/// One control tick: read probes, decide, actuate, report.
///
/// House and collector are decision-critical; an unreadable probe ends the
/// process rather than acting on stale data. The outside probe is optional
/// every single tick.
fn run_tick(
    engine: &mut ControlEngine,
    bus: &W1Bus,
    actuators: &Actuators,
    runtime: &RuntimeConfig,
    tz: Tz,
) -> anyhow::Result<StatusRecord> {
    let now = Utc::now().with_timezone(&tz);
    let sensors = &runtime.sensors;

    let house = bus
        .read_temp(&sensors.house)
        .with_context(|| format!("house sensor {} unreadable", sensors.house))?;
    let collector = bus
        .read_temp(&sensors.collector)
        .with_context(|| format!("collector sensor {} unreadable", sensors.collector))?;
    let outside = match bus.read_temp(&sensors.outside) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!("outside sensor unavailable: {err}");
            None
        }
    };

    let readings = Readings {
        house,
        collector,
        outside,
    };
    let outcome = engine.tick(readings, now.time());

    actuators.fan.set_duty(outcome.fan_duty)?;
    if let Some(on) = outcome.relay {
        actuators.relay.set(on)?;
    }

    Ok(StatusRecord {
        timestamp: now.naive_local(),
        house,
        collector,
        fan_fraction: outcome.fan_duty / 100.0,
        outside,
        relay: outcome.relay,
        target: outcome.target,
    })
}

fn load_runtime_config(path: Option<&Path>) -> anyhow::Result<RuntimeConfig> {
    let Some(path) = path else {
        return Ok(RuntimeConfig::default());
    };

    match std::fs::read(path) {
        Ok(raw) => serde_json::from_slice(&raw)
            .with_context(|| format!("invalid runtime config at {}", path.display())),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!("runtime config {} not found, using defaults", path.display());
            Ok(RuntimeConfig::default())
        }
        Err(err) => Err(err).with_context(|| format!("could not read {}", path.display())),
    }
}

fn apply_cli(runtime: &mut RuntimeConfig, cli: &Cli) {
    runtime.control.mode = cli.mode.into();
    runtime.control.off |= cli.off;
    if let Some(span) = cli.span {
        runtime.control.span_c = span;
    }
    if let Some(sleep) = cli.sleep {
        runtime.control.tick_seconds = sleep;
    }
    if let Some(overheat) = cli.overheat {
        runtime.control.overheat_c = overheat;
    }
    if let Some(timezone) = &cli.timezone {
        runtime.timezone = timezone.clone();
    }
}
