// Copyright (c) 2025 Unfolded Circle ApS, Markus Zehnder <markus.z@unfoldedcircle.com>
// SPDX-License-Identifier: MPL-2.0

//! Brightness conversion between the Crownstone scale (0..100) and the entity scale (0..255).
//!
//! Both conversions round to the nearest value, ties round up: `to_external(30)` is 77.
//! Crownstone values above 100 are clamped.

/// Maximum Crownstone switch state.
pub const CROWNSTONE_MAX: u8 = 100;
/// Maximum entity brightness.
pub const BRIGHTNESS_MAX: u8 = 255;

/// Crownstone 0..100 to entity brightness 0..255.
pub fn to_external(value: u8) -> u8 {
    let value = value.min(CROWNSTONE_MAX) as u16;
    let max = CROWNSTONE_MAX as u16;
    ((value * BRIGHTNESS_MAX as u16 + max / 2) / max) as u8
}

/// Entity brightness 0..255 to Crownstone 0..100.
pub fn to_internal(value: u8) -> u8 {
    let max = BRIGHTNESS_MAX as u16;
    ((value as u16 * CROWNSTONE_MAX as u16 + max / 2) / max) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 3)]
    #[case(30, 77)]
    #[case(50, 128)]
    #[case(99, 252)]
    #[case(100, 255)]
    fn to_external_returns_scaled_values(#[case] input: u8, #[case] expected: u8) {
        assert_eq!(expected, to_external(input));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 0)]
    #[case(2, 1)]
    #[case(128, 50)]
    #[case(254, 100)]
    #[case(255, 100)]
    fn to_internal_returns_scaled_values(#[case] input: u8, #[case] expected: u8) {
        assert_eq!(expected, to_internal(input));
    }

    #[test]
    fn to_external_clamps_out_of_range_values() {
        assert_eq!(255, to_external(101));
        assert_eq!(255, to_external(u8::MAX));
    }

    #[test]
    fn internal_round_trip_is_within_one() {
        for v in 0..=CROWNSTONE_MAX {
            let result = to_internal(to_external(v));
            assert!(result.abs_diff(v) <= 1, "{v} -> {result}");
        }
    }

    #[test]
    fn external_round_trip_is_within_one() {
        for v in 0..=BRIGHTNESS_MAX {
            let result = to_external(to_internal(v));
            assert!(result.abs_diff(v) <= 1, "{v} -> {result}");
        }
    }
}
