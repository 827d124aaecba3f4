//! `lm-motion` — the per-tick vehicle motion core.
//!
//! Given a distance budget, [`MotionEngine::advance`] moves every component
//! of a logical train along its routing ring, crossing piece boundaries,
//! planning overtakes and flagging collisions.  Everything it touches is
//! borrowed through a [`MotionContext`]; nothing here owns world state.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                     |
//! |-----------------|--------------------------------------------------------------|
//! | [`engine`]      | `MotionEngine` facade, `AdvanceOutcome`                      |
//! | [`context`]     | `MotionContext` — the borrowed world of one call             |
//! | [`accumulator`] | Remainder banking and sub-position stepping                  |
//! | [`transition`]  | Piece-boundary crossing, move-by-pieces, lane stamping       |
//! | [`planner`]     | Road lookahead: overtakes, lane changes, level crossings     |
//! | [`overtake`]    | Overtake-eligibility query against the vehicle ahead         |
//! | [`speed`]       | Target-speed resolver                                        |
//! | [`crash`]       | Collision detection, crash resolution, wreck ballistics      |
//! | [`sink`]        | `EffectSink` (viewport + audio), `NoopSink`, `EffectLog`     |
//!
//! # Call order within one tick
//!
//! 1. `MotionEngine::update_target_speed` for each train.
//! 2. The caller steps the actual speed toward the target.
//! 3. `MotionEngine::advance(distance_per_tick)` for each train, ascending id.
//! 4. `MotionEngine::crash` for any train whose outcome carries `CRASHED`.
//! 5. `MotionEngine::update_wrecks` for crashed trains.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                            |
//! |---------|---------------------------------------------------|
//! | `serde` | Serde derives on `PlanOutcome` and friends.       |

pub mod accumulator;
pub mod context;
pub mod crash;
pub mod engine;
pub mod overtake;
pub mod planner;
pub mod sink;
pub mod speed;
pub mod transition;

#[cfg(test)]
mod tests;

pub use accumulator::{Role, STEP_DISTANCE, StepResult, step_distance};
pub use context::MotionContext;
pub use crash::{find_collision, resolve_crash, update_wreck};
pub use engine::{AdvanceOutcome, MotionEngine, WHISTLE_VARIANTS};
pub use overtake::{OvertakeAvailability, overtake_availability};
pub use planner::{PlanOutcome, plan};
pub use sink::{Effect, EffectLog, EffectSink, NATIVE_FREQUENCY, NoopSink, SoundId, VisualEffect, ZOOM_VEHICLE};
pub use speed::{FootprintLimits, footprint_limits, resolve_target_speed};
pub use transition::{Crossing, cross_boundary, move_by_pieces};
