use chrono::NaiveTime;

use crate::{
    config::ControlConfig,
    cooling::{CoolingState, SmartCooling},
    fan::FanSmoother,
    policy,
    relay::RelayDebounce,
    types::Readings,
};

/// Raw duty-cycle request above 100 forces full speed without averaging.
const OVERDRIVE: f32 = 1000.0;

/// Everything the hardware layer needs to apply after one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    pub target: f32,
    /// Effective duty cycle in [0, 100] after smoothing.
    pub fan_duty: f32,
    /// `None` when relay logic was suppressed (overheat or off mode); the
    /// relay then keeps whatever state it had.
    pub relay: Option<bool>,
    pub cooling: CoolingState,
}

/// The control decision engine.
///
/// Owns all mutable control state (fan history, relay hold window, cooling
/// state machine) for the process lifetime and is driven by exactly one
/// caller, once per tick. It never touches hardware; the returned
/// [`TickOutcome`] is applied by the actuator layer.
#[derive(Debug)]
pub struct ControlEngine {
    config: ControlConfig,
    fan: FanSmoother,
    relay: RelayDebounce,
    cooling: SmartCooling,
}

impl ControlEngine {
    pub fn new(config: ControlConfig) -> Self {
        let fan = FanSmoother::new(config.fan_history);
        let relay = RelayDebounce::new(config.tick_seconds, config.relay_hold_seconds);
        let cooling = SmartCooling::new(
            config.tick_seconds,
            config.cooling_test_seconds,
            config.cooling_rest_seconds,
        );
        Self {
            config,
            fan,
            relay,
            cooling,
        }
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn cooling_state(&self) -> CoolingState {
        self.cooling.state()
    }

    /// Runs one control tick over the given sensor readings.
    pub fn tick(&mut self, readings: Readings, now: NaiveTime) -> TickOutcome {
        self.cooling.step();

        let Readings {
            house,
            collector,
            outside,
        } = readings;

        let target = policy::target(
            house,
            self.config.mode,
            now,
            self.config.night_transition_seconds,
        );

        if collector > self.config.overheat_c {
            return TickOutcome {
                target,
                fan_duty: self.fan.set(OVERDRIVE),
                relay: None,
                cooling: self.cooling.state(),
            };
        }

        if self.config.off {
            return TickOutcome {
                target,
                fan_duty: self.fan.set(0.0),
                relay: None,
                cooling: self.cooling.state(),
            };
        }

        // Temperature delta (>= 0) worth acting on, for either direction.
        let mut potential: f32 = 0.0;

        if house < target {
            potential = potential.max(collector - house);
        }

        if house > target {
            potential = potential.max(house - collector);

            // The collector may hold a leftover heat bubble while outside air
            // is already cooler; probe for it instead of committing, and only
            // when no earlier probe is testing or resting.
            if let Some(outside) = outside {
                if outside < house {
                    if self.cooling.state() == CoolingState::Open && collector > house {
                        self.cooling.test();
                    }
                    if self.cooling.state() == CoolingState::Testing {
                        potential = potential.max(house - outside);
                    }
                }
            }
        }

        let span = self.config.span_c;
        let want = (potential.min((house - target).abs()) * 100.0 / span).min(100.0);
        let fan_duty = self.fan.set(want);

        let sufficiently_cooler_outside = outside.is_some_and(|o| o + span < house);
        let relay = self.relay.set(house > target && sufficiently_cooler_outside);

        TickOutcome {
            target,
            fan_duty,
            relay: Some(relay),
            cooling: self.cooling.state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::ControlMode;

    fn noon() -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, 0).unwrap()
    }

    fn summer_config() -> ControlConfig {
        ControlConfig {
            mode: ControlMode::Summer,
            fan_history: 1,
            ..ControlConfig::default()
        }
    }

    fn readings(house: f32, collector: f32, outside: Option<f32>) -> Readings {
        Readings {
            house,
            collector,
            outside,
        }
    }

    #[test]
    fn residual_collector_heat_triggers_a_cooling_test() {
        let mut engine = ControlEngine::new(summer_config());

        // summer noon: target 22; house too warm, collector warmer still,
        // outside clearly cooler
        let outcome = engine.tick(readings(25.0, 40.0, Some(18.0)), noon());

        assert_eq!(outcome.target, 22.0);
        assert_eq!(outcome.cooling, CoolingState::Testing);
        // potential = house - outside = 7, clipped by |house - target| = 3,
        // span 1 saturates the fan
        assert_eq!(outcome.fan_duty, 100.0);
        assert_eq!(outcome.relay, Some(true));
    }

    #[test]
    fn overheat_forces_full_speed_and_suppresses_relay() {
        let mut engine = ControlEngine::new(summer_config());

        let outcome = engine.tick(readings(22.0, 60.0, Some(18.0)), noon());

        assert_eq!(outcome.fan_duty, 100.0);
        assert_eq!(outcome.relay, None);
    }

    #[test]
    fn off_mode_stops_the_fan_but_keeps_the_overheat_guard() {
        let config = ControlConfig {
            off: true,
            ..summer_config()
        };
        let mut engine = ControlEngine::new(config);

        let idle = engine.tick(readings(25.0, 40.0, Some(18.0)), noon());
        assert_eq!(idle.fan_duty, 0.0);
        assert_eq!(idle.relay, None);

        let overheat = engine.tick(readings(25.0, 60.0, Some(18.0)), noon());
        assert_eq!(overheat.fan_duty, 100.0);
        assert_eq!(overheat.relay, None);
    }

    #[test]
    fn heating_ramps_with_collector_surplus() {
        let config = ControlConfig {
            mode: ControlMode::Heating,
            fan_history: 1,
            ..ControlConfig::default()
        };
        let mut engine = ControlEngine::new(config);

        // heating daytime target is 24; collector barely warmer than house
        let outcome = engine.tick(readings(20.0, 20.5, None), noon());

        // potential 0.5, |house - target| = 4, span 1: half speed
        assert_eq!(outcome.fan_duty, 50.0);
        assert_eq!(outcome.relay, Some(false));
    }

    #[test]
    fn missing_outside_reading_disables_the_probe() {
        let mut engine = ControlEngine::new(summer_config());

        let outcome = engine.tick(readings(25.0, 40.0, None), noon());

        assert_eq!(outcome.cooling, CoolingState::Open);
        // warm-branch potential max(0, 25 - 40) = 0
        assert_eq!(outcome.fan_duty, 0.0);
        assert_eq!(outcome.relay, Some(false));
    }

    #[test]
    fn outside_zero_is_a_reading_not_an_absence() {
        let mut engine = ControlEngine::new(summer_config());

        let outcome = engine.tick(readings(25.0, 40.0, Some(0.0)), noon());

        assert_eq!(outcome.cooling, CoolingState::Testing);
        assert_eq!(outcome.relay, Some(true));
    }

    #[test]
    fn no_new_test_while_resting() {
        let mut engine = ControlEngine::new(summer_config());
        let test_ticks = (660.0 / 30.0) as usize;

        engine.tick(readings(25.0, 40.0, Some(18.0)), noon());
        assert_eq!(engine.cooling_state(), CoolingState::Testing);

        for _ in 0..test_ticks {
            engine.tick(readings(25.0, 40.0, Some(18.0)), noon());
        }
        assert_eq!(engine.cooling_state(), CoolingState::Resting);

        // while resting the probe potential is gone and the fan falls back to
        // the plain warm-branch computation
        let outcome = engine.tick(readings(25.0, 40.0, Some(18.0)), noon());
        assert_eq!(outcome.cooling, CoolingState::Resting);
        assert_eq!(outcome.fan_duty, 0.0);
    }

    #[test]
    fn relay_needs_outside_sufficiently_below_house() {
        let mut engine = ControlEngine::new(summer_config());

        // outside + span == house is not sufficient
        let outcome = engine.tick(readings(25.0, 20.0, Some(24.0)), noon());
        assert_eq!(outcome.relay, Some(false));
    }

    #[test]
    fn relay_hold_window_keeps_previous_state() {
        let mut engine = ControlEngine::new(summer_config());
        let hold_ticks = (300.0 / 30.0) as usize;

        let first = engine.tick(readings(25.0, 40.0, Some(18.0)), noon());
        assert_eq!(first.relay, Some(true));

        // conditions flip but the hold window pins the output
        for _ in 0..hold_ticks {
            let held = engine.tick(readings(21.9, 20.0, Some(18.0)), noon());
            assert_eq!(held.relay, Some(true));
        }

        let released = engine.tick(readings(21.9, 20.0, Some(18.0)), noon());
        assert_eq!(released.relay, Some(false));
    }

    #[test]
    fn dead_band_returns_house_and_idles() {
        let mut engine = ControlEngine::new(summer_config());
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();

        // 08:00-10:00 summer gap: heating target 20, cooling target 22
        let outcome = engine.tick(readings(21.0, 30.0, Some(15.0)), nine);

        assert_eq!(outcome.target, 21.0);
        assert_eq!(outcome.fan_duty, 0.0);
        assert_eq!(outcome.relay, Some(false));
    }
}
