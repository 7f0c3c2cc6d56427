//! Sysfs view of the 1-wire bus and its DS18B20 temperature probes.

use std::{fs, io, path::PathBuf};

use thiserror::Error;

const BUS_DIR: &str = "/sys/bus/w1/devices";

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor io: {0}")]
    Io(#[from] io::Error),
    #[error("sensor payload not understood: {0:?}")]
    Parse(String),
    #[error("sensor checksum failed")]
    Crc,
}

#[derive(Debug, Clone)]
pub struct W1Bus {
    dir: PathBuf,
}

impl W1Bus {
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from(BUS_DIR),
        }
    }

    /// Slave ids currently enumerated by the bus master, e.g.
    /// `28-02149245b4f2`.
    pub fn slave_names(&self) -> io::Result<Vec<String>> {
        let raw = fs::read_to_string(self.dir.join("w1_bus_master1/w1_master_slaves"))?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect())
    }

    /// Current temperature of the named probe in °C.
    pub fn read_temp(&self, name: &str) -> Result<f32, SensorError> {
        let payload = fs::read_to_string(self.dir.join(name).join("w1_slave"))?;
        parse_payload(&payload)
    }
}

/// Parses a `w1_slave` payload:
///
/// ```text
/// dc 01 4b 46 7f ff 0c 10 45 : crc=45 YES
/// dc 01 4b 46 7f ff 0c 10 45 t=29750
/// ```
///
/// The kernel reports the checksum verdict on the first line and the
/// temperature in milli-degrees on the last. A reading of `t=0` is a valid
/// 0.0 °C, not an absence.
fn parse_payload(payload: &str) -> Result<f32, SensorError> {
    let mut lines = payload.lines();

    let crc_line = lines
        .next()
        .ok_or_else(|| SensorError::Parse(payload.to_owned()))?;
    if !crc_line.trim_end().ends_with("YES") {
        return Err(SensorError::Crc);
    }

    let temp_line = lines
        .next()
        .ok_or_else(|| SensorError::Parse(payload.to_owned()))?;
    let milli = temp_line
        .rsplit_once("t=")
        .and_then(|(_, value)| value.trim().parse::<i32>().ok())
        .ok_or_else(|| SensorError::Parse(temp_line.to_owned()))?;

    Ok(milli as f32 / 1000.0)
}
