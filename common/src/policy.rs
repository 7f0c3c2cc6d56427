//! Target-temperature policy.
//!
//! The desired house temperature is a fixed piecewise function of the
//! current house temperature, the season mode and the local wall-clock
//! time. Two candidate targets are computed (one assuming we may need to
//! cool, one assuming we may need to heat) and then reconciled against the
//! actual house temperature.

use chrono::{NaiveTime, Timelike};
use tracing::warn;

use crate::types::ControlMode;

const NIGHT_START_S: u32 = 3600; // 01:00
const NIGHT_END_S: u32 = 8 * 3600; // 08:00

/// Desired house temperature in °C for this tick.
///
/// `transition_seconds` is the length of the linear ramp from the day
/// target down to the night target, measured from the start of the night
/// window. Only the time of day of `now` matters, never the date.
pub fn target(house: f32, mode: ControlMode, now: NaiveTime, transition_seconds: f32) -> f32 {
    let summer = mode.is_summer();

    let night_temp = if summer { 20.0 } else { 22.0 };
    let day_temp = if summer { 22.0 } else { 24.0 };
    // sufficiently after the night window to not heat too early in summer
    let day_start_s = if summer { 10 * 3600 } else { 8 * 3600 };

    let secs = now.num_seconds_from_midnight();

    let cooling_target = if !(NIGHT_START_S..=NIGHT_END_S).contains(&secs) {
        day_temp
    } else {
        let elapsed = (secs - NIGHT_START_S) as f32;
        if elapsed > transition_seconds {
            night_temp
        } else {
            day_temp - (day_temp - night_temp) * elapsed / transition_seconds
        }
    };

    let heating_target = if (NIGHT_START_S..day_start_s).contains(&secs) {
        night_temp
    } else {
        day_temp
    };

    resolve(house, cooling_target, heating_target)
}

/// Reconciles the two candidate targets against the house temperature.
fn resolve(house: f32, cooling_target: f32, heating_target: f32) -> f32 {
    if cooling_target == heating_target {
        return cooling_target;
    }

    // between the two targets nothing needs to happen
    if heating_target <= house && house <= cooling_target {
        return house;
    }

    if house >= cooling_target && house >= heating_target {
        return cooling_target;
    }

    if house <= cooling_target && house <= heating_target {
        return heating_target;
    }

    // cooling and heating demanded at once, the window constants overlap
    warn!(
        house,
        cooling_target, heating_target, "conflicting temperature targets"
    );
    (cooling_target + heating_target) / 2.0
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TRANSITION: f32 = 7200.0;

    fn at(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn summer_night_ramp_interpolates() {
        // 02:00 is halfway through the two hour ramp from 22 down to 20
        assert_eq!(target(30.0, ControlMode::Summer, at(2, 0), TRANSITION), 21.0);
    }

    #[test]
    fn summer_night_settles_on_night_target_after_ramp() {
        assert_eq!(target(30.0, ControlMode::Summer, at(5, 0), TRANSITION), 20.0);
    }

    #[test]
    fn summer_noon_targets_agree_regardless_of_house() {
        assert_eq!(target(35.0, ControlMode::Summer, at(12, 0), TRANSITION), 22.0);
        assert_eq!(target(10.0, ControlMode::Summer, at(12, 0), TRANSITION), 22.0);
    }

    #[test]
    fn summer_morning_gap_is_a_dead_band() {
        // Between night end (08:00) and summer day start (10:00) the cooling
        // target is 22 while the heating target is still 20.
        assert_eq!(target(21.0, ControlMode::Summer, at(9, 0), TRANSITION), 21.0);
        assert_eq!(target(23.0, ControlMode::Summer, at(9, 0), TRANSITION), 22.0);
        assert_eq!(target(19.0, ControlMode::Summer, at(9, 0), TRANSITION), 20.0);
    }

    #[test]
    fn heating_mode_uses_warmer_constants() {
        // deep night, ramp finished: cooling 22, heating 22
        assert_eq!(target(18.0, ControlMode::Heating, at(4, 0), TRANSITION), 22.0);
        // daytime: both targets are 24
        assert_eq!(target(18.0, ControlMode::Heating, at(15, 0), TRANSITION), 24.0);
    }

    #[test]
    fn conflicting_targets_settle_on_the_midpoint() {
        assert_eq!(resolve(22.0, 20.0, 24.0), 22.0);
    }

    #[test]
    fn ramp_start_boundary_holds_day_target() {
        assert_eq!(target(30.0, ControlMode::Summer, at(1, 0), TRANSITION), 22.0);
    }
}
