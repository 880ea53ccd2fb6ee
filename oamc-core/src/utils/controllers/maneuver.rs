//! Avoidance maneuver state machine.
//!
//! Below `max_dist_cm` the speed follows the distance through
//! [`distance_to_speed`]. At or above it the controller runs a timed
//! stop → reverse → creep sequence. Any reading below the threshold aborts the
//! sequence on the spot.
//!
//! The speed emitted on a tick belongs to the state the tick started in; a
//! timed transition shows up in the command of the following tick.

use serde::{Deserialize, Serialize};

use crate::utils::{config::ManeuverConfig, math::mapping::distance_to_speed};

/// Maneuver phase, with the entry time of the timed phases.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ManeuverState {
    #[default]
    Normal,
    Stopping { since: u32 },
    Reversing { since: u32 },
    CreepForward,
}

/// One controller tick: `(state, distance, now) -> (next state, speed)`.
pub fn step(
    state: ManeuverState,
    distance_cm: u16,
    now_ms: u32,
    cfg: &ManeuverConfig,
) -> (ManeuverState, i8) {
    if distance_cm < cfg.max_dist_cm {
        let speed = distance_to_speed(distance_cm, cfg.min_dist_cm, cfg.max_dist_cm);
        return (ManeuverState::Normal, speed);
    }

    match state {
        ManeuverState::Normal => (ManeuverState::Stopping { since: now_ms }, 0),
        ManeuverState::Stopping { since } => {
            if now_ms.wrapping_sub(since) >= cfg.stop_ms {
                (ManeuverState::Reversing { since: now_ms }, 0)
            } else {
                (state, 0)
            }
        }
        ManeuverState::Reversing { since } => {
            if now_ms.wrapping_sub(since) >= cfg.reverse_ms {
                (ManeuverState::CreepForward, cfg.reverse_speed)
            } else {
                (state, cfg.reverse_speed)
            }
        }
        ManeuverState::CreepForward => (state, cfg.creep_speed),
    }
}

/// Owns the maneuver state and feeds it through [`step`] once per tick.
#[derive(Debug, Default)]
pub struct ManeuverController {
    state: ManeuverState,
    config: ManeuverConfig,
}

impl ManeuverController {
    pub fn new(config: ManeuverConfig) -> Self {
        Self {
            state: ManeuverState::Normal,
            config,
        }
    }

    pub fn state(&self) -> ManeuverState {
        self.state
    }

    /// Advance by one tick and return the commanded speed.
    pub fn tick(
        &mut self,
        distance_cm: u16,
        now_ms: u32,
    ) -> i8 {
        let (next, speed) = step(self.state, distance_cm, now_ms, &self.config);
        if core::mem::discriminant(&next) != core::mem::discriminant(&self.state) {
            tracing::debug!(from = ?self.state, to = ?next, distance_cm, "maneuver transition");
        }
        self.state = next;
        speed
    }
}
