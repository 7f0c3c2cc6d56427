pub mod config;
pub mod cooling;
pub mod engine;
pub mod fan;
pub mod policy;
pub mod relay;
pub mod types;

pub use config::{ControlConfig, FanPwmConfig, RelayConfig, RuntimeConfig, SensorIds};
pub use cooling::{CoolingState, SmartCooling};
pub use engine::{ControlEngine, TickOutcome};
pub use fan::FanSmoother;
pub use relay::RelayDebounce;
pub use types::{ControlMode, Readings, StatusRecord, OUTSIDE_SENTINEL_C};
