//! Count to lux conversion.
//!
//! The sensor response is not linear. The conversion normalizes the raw count
//! by gain and integration time and then interpolates a calibration table
//! obtained by curve fitting against a reference sensor:
//!
//! `lux = 478.233 x + 0.0416391 x³ − 1.18758e-06 x⁵`, with
//! `x = count / (gain × itime × (als_conv + 1))`.
//!
//! Everything is integer math, suitable for small microcontrollers.

use crate::registers::DeviceState;

/// Lux × 256 at normalized count 0, 1, 2, ...
pub const LUX_256: [u32; 132] = [
    0, 122438, 244941, 367571, 490392, 613470, 736866, //
    860645, 984869, 1109602, 1234906, 1360843, 1487476, 1614866, //
    1743074, 1872160, 2002185, 2133209, 2265290, 2398487, 2532857, //
    2668458, 2805345, 2943575, 3083201, 3224279, 3366860, 3510997, //
    3656742, 3804143, 3953251, 4104114, 4256778, 4411289, 4567692, //
    4726031, 4886347, 5048682, 5213076, 5379566, 5548189, 5718982, //
    5891978, 6067209, 6244707, 6424501, 6606619, 6791087, 6977929, //
    7167169, 7358827, 7552923, 7749474, 7948496, 8150002, 8354004, //
    8560513, 8769534, 8981075, 9195140, 9411728, 9630841, 9852474, //
    10076624, 10303283, 10532440, 10764085, 10998203, 11234777, 11473788, //
    11715214, 11959032, 12205214, 12453731, 12704552, 12957642, 13212962, //
    13470475, 13730135, 13991899, 14255718, 14521539, 14789310, 15058972, //
    15330466, 15603728, 15878692, 16155289, 16433445, 16713087, 16994133, //
    17276503, 17560111, 17844868, 18130682, 18417457, 18705095, 18993492, //
    19282544, 19572141, 19862170, 20152513, 20443051, 20733660, 21024212, //
    21314576, 21604616, 21894194, 22183166, 22471385, 22758701, 23044960, //
    23330001, 23613663, 23895778, 24176175, 24454680, 24731113, 25005290, //
    25277023, 25546121, 25812386, 26075617, 26335611, 26592155, 26845037, //
    27094038, 27338933, 27579496, 27815494, 28046689, 28272839,
];

/// Illuminance, stored as lux × 256
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Lux(u32);

impl Lux {
    /// Wrap a lux × 256 value
    pub const fn from_scaled(lux_256: u32) -> Self {
        Self(lux_256)
    }

    /// Lux × 256
    pub const fn scaled(self) -> u32 {
        self.0
    }

    /// Whole lux, truncated
    pub const fn lux(self) -> u32 {
        self.0 / 256
    }

    /// Lux as a float, keeping the fractional part
    pub fn as_f32(self) -> f32 {
        self.0 as f32 / 256.0
    }
}

/// Normalized count scaled by 256: `256 × count / (gain × cycles)`
pub const fn normalized_count(count: u16, gain: u32, integration_cycles: u32) -> u32 {
    (256 * count as u32) / (gain * integration_cycles)
}

/// Linear interpolation of [`LUX_256`] at the 8.8 fixed point index `q`.
///
/// Indexes at or past the end of the table saturate at its last entry.
pub fn interpolate(q: u32) -> Lux {
    let last_index = LUX_256.len() - 1;
    let x1 = (q >> 8) as usize;
    if x1 >= last_index {
        return Lux(LUX_256[last_index]);
    }
    let y1 = LUX_256[x1];
    let y2 = LUX_256[x1 + 1];
    let delta_x = q & 0xFF;
    let delta_y = (y2 - y1) * delta_x / 256;
    Lux(y1 + delta_y)
}

/// Convert a raw count to lux with the gain and timing held in `state`
pub fn count_to_lux(count: u16, state: &DeviceState) -> Lux {
    interpolate(normalized_count(
        count,
        state.gain(),
        state.integration_cycles(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{Gain, IntegrationTime};

    #[test]
    fn test_table_is_non_decreasing() {
        assert_eq!(LUX_256.len(), 132);
        for pair in LUX_256.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_interpolation_hits_table_points() {
        for (i, value) in LUX_256.iter().enumerate() {
            assert_eq!(interpolate((i as u32) << 8).scaled(), *value);
        }
    }

    #[test]
    fn test_interpolation_midpoint() {
        // halfway between index 0 and 1
        assert_eq!(interpolate(128).scaled(), 122438 / 2);
        let q = (10 << 8) | 64;
        let expected = LUX_256[10] + (LUX_256[11] - LUX_256[10]) * 64 / 256;
        assert_eq!(interpolate(q).scaled(), expected);
    }

    #[test]
    fn test_interpolation_stays_within_segment() {
        for q in (0u32..(131 << 8)).step_by(37) {
            let x1 = (q >> 8) as usize;
            let lux = interpolate(q).scaled();
            assert!(lux >= LUX_256[x1]);
            assert!(lux <= LUX_256[x1 + 1]);
        }
    }

    #[test]
    fn test_zero_count_is_zero_lux() {
        let state = DeviceState::power_on_defaults();
        assert_eq!(count_to_lux(0, &state), Lux::from_scaled(0));
    }

    #[test]
    fn test_worked_example() {
        let mut state = DeviceState::zeroed();
        state.pga_als = Gain::Gain4x;
        state.int_time = IntegrationTime::T16;
        state.als_conv = 0;
        assert_eq!(normalized_count(8000, state.gain(), state.integration_cycles()), 32000);
        let lux = count_to_lux(8000, &state);
        assert_eq!(lux.scaled(), LUX_256[125]);
        assert_eq!(lux.lux(), LUX_256[125] / 256);
        assert_eq!(lux.lux(), 104863);
    }

    #[test]
    fn test_photodiode_doubling_halves_normalized_count() {
        let mut state = DeviceState::zeroed();
        state.pga_als = Gain::Gain4x;
        let plain = normalized_count(4096, state.gain(), state.integration_cycles());
        state.pd_sel = true;
        let doubled = normalized_count(4096, state.gain(), state.integration_cycles());
        assert_eq!(plain, 2 * doubled);
    }

    #[test]
    fn test_full_scale_does_not_overflow() {
        // 1x gain, 1T: the whole u16 range maps far beyond the table
        let state = DeviceState::zeroed();
        let lux = count_to_lux(u16::MAX, &state);
        assert_eq!(lux.scaled(), LUX_256[131]);
        assert_eq!(interpolate((131 << 8) + 200), lux);
    }

    #[test]
    fn test_lux_accessors() {
        let lux = Lux::from_scaled(256 * 12 + 128);
        assert_eq!(lux.lux(), 12);
        assert_eq!(lux.as_f32(), 12.5);
    }
}
