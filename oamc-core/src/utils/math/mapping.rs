//! Integer range mapping used by the controller and the indicators.
//!
//! `map_range` follows the classic microcontroller `map()`: integer arithmetic
//! with truncating division and no clamping of the result.
//!
//! # Example
//! ```rust
//! use oamc_core::utils::math::mapping::{distance_to_speed, map_range};
//! assert_eq!(map_range(50, 0, 100, 0, 255), 127);
//! assert_eq!(distance_to_speed(0, 5, 60), 100);
//! ```

/// Linearly re-map `x` from `[in_min, in_max]` to `[out_min, out_max]`.
///
/// Returns `out_min` when the input range is empty.
pub fn map_range(
    x: i32,
    in_min: i32,
    in_max: i32,
    out_min: i32,
    out_max: i32,
) -> i32 {
    if in_max == in_min {
        return out_min;
    }
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Round down to the nearest even value (toward zero).
pub fn quantize_even(v: i32) -> i32 {
    (v / 2) * 2
}

/// Normal-mode speed for a distance reading.
///
/// `0` is the sensor's "nothing detected" sentinel and maps to full speed.
pub fn distance_to_speed(
    distance_cm: u16,
    min_dist_cm: u16,
    max_dist_cm: u16,
) -> i8 {
    if distance_cm == 0 {
        return 100;
    }
    if distance_cm <= min_dist_cm {
        return 0;
    }
    let mapped = map_range(
        i32::from(distance_cm),
        i32::from(min_dist_cm),
        i32::from(max_dist_cm),
        0,
        100,
    );
    quantize_even(mapped).clamp(0, 100) as i8
}

/// Duty for a speed magnitude, never zero for a non-zero magnitude.
pub fn magnitude_to_duty(
    magnitude_pct: u8,
    max_duty: u16,
) -> u16 {
    let mag = u32::from(magnitude_pct.min(100));
    let duty = (u32::from(max_duty) * mag).div_ceil(100);
    duty as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_range_truncates() {
        assert_eq!(map_range(6, 5, 60, 0, 100), 1);
        assert_eq!(map_range(59, 5, 60, 0, 100), 98);
        assert_eq!(map_range(60, 5, 60, 0, 100), 100);
        assert_eq!(map_range(3, 3, 3, 7, 100), 7);
    }

    #[test]
    fn test_quantize_even() {
        assert_eq!(quantize_even(0), 0);
        assert_eq!(quantize_even(1), 0);
        assert_eq!(quantize_even(99), 98);
        assert_eq!(quantize_even(100), 100);
    }

    #[test]
    fn test_distance_to_speed_edges() {
        assert_eq!(distance_to_speed(0, 5, 60), 100);
        assert_eq!(distance_to_speed(2, 5, 60), 0);
        assert_eq!(distance_to_speed(5, 5, 60), 0);
        assert_eq!(distance_to_speed(59, 5, 60), 98);
        assert_eq!(distance_to_speed(10, 5, 60), 8);
        assert_eq!(distance_to_speed(400, 5, 60), 100);
    }

    #[test]
    fn test_mapped_speed_is_even_and_bounded() {
        for d in 0..=400u16 {
            let s = distance_to_speed(d, 5, 60);
            assert!((0..=100).contains(&s), "speed {} out of range at {}", s, d);
            assert_eq!(s % 2, 0, "odd speed {} at {}", s, d);
        }
    }

    #[test]
    fn test_magnitude_to_duty() {
        assert_eq!(magnitude_to_duty(0, 255), 0);
        assert_eq!(magnitude_to_duty(1, 255), 3);
        assert_eq!(magnitude_to_duty(100, 255), 255);
        assert_eq!(magnitude_to_duty(1, 10), 1);
        assert_eq!(magnitude_to_duty(250, 4095), 4095);

        let mut last = 0;
        for m in 1..=100u8 {
            let d = magnitude_to_duty(m, 255);
            assert!(d >= last && d > 0);
            last = d;
        }
    }
}
