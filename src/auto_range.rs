//! Automatic selection of gain and integration time.
//!
//! After every measurement the raw count is compared with a hysteresis band
//! spanning the middle three quarters of the counter range. Outside the band
//! exactly one setting moves one step. Sensitivity goes down by shortening the
//! measurement first (`als_conv`, then `int_time`) and lowering the gain last,
//! and goes up by raising the gain first. Repeated measurements walk the
//! configuration towards the band.

use crate::registers::{DeviceState, Gain, IntegrationTime, MAX_ALS_CONV};

/// One configuration change chosen by [`adjust`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Adjustment {
    /// New integration time and conversion count (ALS_TIME register)
    Integration(IntegrationTime, u8),
    /// New amplifier gain (ALS_GAIN register)
    Gain(Gain),
}

impl Adjustment {
    /// Apply the change to the software state
    pub fn apply(self, state: &mut DeviceState) {
        match self {
            Adjustment::Integration(int_time, als_conv) => {
                state.int_time = int_time;
                state.als_conv = als_conv;
            }
            Adjustment::Gain(gain) => state.pga_als = gain,
        }
    }
}

/// Upper edge of the band: `max_count − max_count / 8`
pub const fn upper_bound(max_count: u32) -> u32 {
    max_count - max_count / 8
}

/// Lower edge of the band: `max_count / 8`
pub const fn lower_bound(max_count: u32) -> u32 {
    max_count / 8
}

/// Pick the next configuration step for a measurement of `count` taken with
/// `state`, or `None` when the count is inside the band or no setting can
/// move further.
pub fn adjust(
    count: u32,
    max_count: u32,
    saturated: bool,
    state: &DeviceState,
) -> Option<Adjustment> {
    if saturated || count > upper_bound(max_count) {
        decrease(state)
    } else if count < lower_bound(max_count) {
        increase(state)
    } else {
        None
    }
}

fn decrease(state: &DeviceState) -> Option<Adjustment> {
    if state.als_conv > 0 {
        Some(Adjustment::Integration(state.int_time, state.als_conv - 1))
    } else if let Some(int_time) = state.int_time.step_down() {
        Some(Adjustment::Integration(int_time, 0))
    } else {
        state.pga_als.step_down().map(Adjustment::Gain)
    }
}

fn increase(state: &DeviceState) -> Option<Adjustment> {
    if let Some(gain) = state.pga_als.step_up() {
        Some(Adjustment::Gain(gain))
    } else if let Some(int_time) = state.int_time.step_up() {
        Some(Adjustment::Integration(int_time, 0))
    } else if state.als_conv < MAX_ALS_CONV {
        Some(Adjustment::Integration(state.int_time, state.als_conv + 1))
    } else {
        None
    }
}
