//! Compile-time tuning for the controller.
//!
//! Every threshold is a constant; the grouping structs exist so components can
//! be built against an explicit set of values in tests. Times are milliseconds
//! unless the field name says otherwise.

/// HC-SR04 trigger/echo timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorTiming {
    /// Minimum time between two physical triggers (acoustic settling).
    pub min_interval_ms: u32,
    /// Bound on the whole echo wait, rising edge included.
    pub echo_timeout_us: u32,
    /// Low time before the trigger pulse.
    pub settle_us: u32,
    /// Width of the trigger pulse.
    pub trigger_pulse_us: u32,
    /// Echo line polling step.
    pub poll_step_us: u32,
}

impl SensorTiming {
    pub const DEFAULT: Self = Self {
        min_interval_ms: 50,
        echo_timeout_us: 30_000,
        settle_us: 2,
        trigger_pulse_us: 10,
        poll_step_us: 1,
    };
}

impl Default for SensorTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Round-trip echo microseconds per centimetre.
pub const ECHO_US_PER_CM: u32 = 58;
/// Shortest distance the sensor can resolve.
pub const MIN_VALID_CM: u16 = 2;
/// Longest distance the sensor can resolve.
pub const MAX_VALID_CM: u16 = 400;

/// Commanded magnitudes below this are forced to zero.
pub const MOTOR_DEADBAND_PCT: u8 = 3;

/// Thresholds and timings of the avoidance maneuver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManeuverConfig {
    /// At or below this distance the mapped speed is zero.
    pub min_dist_cm: u16,
    /// At or above this distance the maneuver branch is taken.
    pub max_dist_cm: u16,
    pub stop_ms: u32,
    pub reverse_ms: u32,
    pub reverse_speed: i8,
    pub creep_speed: i8,
}

impl ManeuverConfig {
    pub const DEFAULT: Self = Self {
        min_dist_cm: 5,
        max_dist_cm: 60,
        stop_ms: 500,
        reverse_ms: 200,
        reverse_speed: -20,
        creep_speed: 20,
    };
}

impl Default for ManeuverConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Control loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Ticks arriving sooner than this after the previous one are skipped.
    pub update_interval_ms: u32,
    /// Command applied by `begin`, before the first reading.
    pub startup_speed: i8,
}

impl LoopTiming {
    pub const DEFAULT: Self = Self {
        update_interval_ms: 10,
        startup_speed: 100,
    };
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}
