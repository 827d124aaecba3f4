//! Engine and simulation configuration.
//!
//! The decision constants of the planner and speed resolver are tuned against
//! reference replays, so they live here rather than as literals in the
//! algorithms.  [`MotionConfig::default`] reproduces the reference policy.

use crate::{CoreError, CoreResult, Speed16, Speed32};

/// Distance that must accumulate before one sub-position step is taken.
///
/// Every entry of the step-distance table is strictly below this, so a step
/// always leaves a positive remainder.
pub const QUANTUM: i32 = 0x368A;

// ── MotionConfig ──────────────────────────────────────────────────────────────

/// Tunables for the motion core.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    /// Sub-position step threshold.  Must equal [`QUANTUM`]; kept in the
    /// config so a replay file can assert which quantum it was recorded with.
    pub quantum: i32,

    /// Number of ring cells the overtake planner may look ahead.  Default 11.
    pub overtake_horizon: u8,

    /// Consecutive free own-lane cells needed past an overtakeable peer before
    /// the overtaker may pull back in.  Default 5.  Blockers that are not
    /// eligible peers need one.
    pub overtake_clear_run: u8,

    /// Faster-around-curves bonus is `target / divisor`.  Default 4 (×1.25).
    pub curve_bonus_divisor: i16,

    /// A peer is only overtakeable once it has committed this much lookahead
    /// distance.  Default `0x220C0`.
    pub min_overtake_peer_distance: i32,

    /// Floor for road target speeds.  Default 12 mph.
    pub road_min_speed: Speed16,

    /// Road target speed when the road object is unknown.  Default 60 mph.
    pub unknown_road_speed: Speed16,

    /// Target may exceed the speed implied by last tick's distance by at
    /// most this much.  Default 5 mph.
    pub target_rate_slack: Speed16,

    /// Upper bound on the level-crossing scan.  Default 255.
    pub crossing_scan_limit: u8,

    /// Manual power notch at or below which a manually driven train is
    /// treated as commanded to stop.  Default -20.
    pub manual_stop_notch: i8,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            quantum:                    QUANTUM,
            overtake_horizon:           11,
            overtake_clear_run:         5,
            curve_bonus_divisor:        4,
            min_overtake_peer_distance: 0x220C0,
            road_min_speed:             Speed16::mph(12),
            unknown_road_speed:         Speed16::mph(60),
            target_rate_slack:          Speed16::mph(5),
            crossing_scan_limit:        255,
            manual_stop_notch:          -20,
        }
    }
}

impl MotionConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.quantum != QUANTUM {
            return Err(CoreError::Config(format!(
                "quantum {:#x} does not match the step table (expected {:#x})",
                self.quantum, QUANTUM
            )));
        }
        if self.overtake_horizon < 3 {
            return Err(CoreError::Config("overtake_horizon must be at least 3".into()));
        }
        if self.overtake_clear_run == 0 || self.overtake_clear_run >= self.overtake_horizon {
            return Err(CoreError::Config(
                "overtake_clear_run must be in 1..overtake_horizon".into(),
            ));
        }
        if self.curve_bonus_divisor <= 0 {
            return Err(CoreError::Config("curve_bonus_divisor must be positive".into()));
        }
        if self.crossing_scan_limit < 2 {
            return Err(CoreError::Config("crossing_scan_limit must be at least 2".into()));
        }
        Ok(())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level simulation run configuration.
///
/// Typically loaded from a JSON file by the application and passed to the
/// simulation builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimConfig {
    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Snapshot every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,

    /// Speed gained per tick while below target.
    pub acceleration: Speed32,

    /// Speed lost per tick while above target.
    pub braking: Speed32,

    /// Engine tunables.
    pub motion: MotionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_ticks:           1_000,
            seed:                  0,
            output_interval_ticks: 1,
            acceleration:          Speed32(0x4000),
            braking:               Speed32(0x1_0000),
            motion:                MotionConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if self.acceleration.0 <= 0 || self.braking.0 <= 0 {
            return Err(CoreError::Config("acceleration and braking must be positive".into()));
        }
        self.motion.validate()
    }
}
