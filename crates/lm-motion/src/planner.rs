//! Lookahead planner: what a road lead does when it reaches a piece boundary.
//!
//! The planner reads the ring cells already reserved ahead of the lead and
//! asks the occupancy interface about each one.  It never writes; the
//! transition applies its decision.  Rail leads get the reduced variant,
//! which never plans: crossings are flagged by the transition itself.

use lm_core::{Pos3, RoadKind, TrainId, TransportMode};
use lm_routing::RoutingCell;
use lm_track::{OccupancyResult, TrackNetwork};
use lm_vehicle::MotionState;
use smallvec::SmallVec;

use crate::context::MotionContext;
use crate::overtake::{OvertakeAvailability, overtake_availability};
use crate::sink::EffectSink;

/// Planner decision.  `n` counts ring cells after the lead's current one.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlanOutcome {
    /// Take the normal transition.
    None,
    /// Pull out, pass, and pull back in over `n` cells.
    Overtake(u8),
    /// Wait: something in or around the crossing ahead is blocked.
    NoRoute,
    /// Drive straight over the crossing, `n` cells.
    LevelCrossing(u8),
    /// Move into the other lane for `n` cells and stay there.
    ChangeLane(u8),
}

/// Cells after the lead with their piece origins, nearest first.
type Ahead = SmallVec<[(RoutingCell, Pos3); 16]>;

fn cells_ahead<N: TrackNetwork, S: EffectSink>(
    ctx:   &MotionContext<'_, N, S>,
    mode:  TransportMode,
    state: &MotionState,
) -> Ahead {
    let table = ctx.table(mode);
    let mut ahead = Ahead::new();
    let Some(exit) = table.exit(state.descriptor.key) else { return ahead };
    let mut origin = state.origin + exit.delta;
    for (_, cell) in ctx.routing.ring_view(state.handle).forward() {
        ahead.push((cell, origin));
        match table.exit(cell.key) {
            Some(exit) => origin = origin + exit.delta,
            None => break,
        }
    }
    ahead
}

pub fn plan<N: TrackNetwork, S: EffectSink>(
    ctx:   &MotionContext<'_, N, S>,
    train: TrainId,
    state: &MotionState,
) -> PlanOutcome {
    let t = &ctx.vehicles.trains[train.index()];
    if !t.mode.is_road() {
        return PlanOutcome::None;
    }
    let ahead = cells_ahead(ctx, t.mode, state);
    let own = |i: usize| -> OccupancyResult {
        let (cell, pos) = ahead[i];
        ctx.network.occupancy(t.mode, pos, cell.descriptor())
    };
    let other = |i: usize| -> OccupancyResult {
        let (cell, pos) = ahead[i];
        ctx.network.occupancy(t.mode, pos, cell.descriptor().other_lane())
    };

    let Some(&(first, first_pos)) = ahead.first() else { return PlanOutcome::None };
    let next = own(0);

    // ── Level crossing ahead ──────────────────────────────────────────────
    if next.has_level_crossing {
        if next.is_blocked() {
            return PlanOutcome::NoRoute;
        }
        let limit = ctx.config.crossing_scan_limit;
        let mut count: u8 = 2;
        for i in 1..ahead.len() {
            if count >= limit {
                break;
            }
            let occupancy = own(i);
            if occupancy.is_blocked() {
                return PlanOutcome::NoRoute;
            }
            if !occupancy.has_level_crossing {
                return PlanOutcome::LevelCrossing(count);
            }
            count += 1;
        }
        return PlanOutcome::NoRoute;
    }

    // ── Obstruction in the next cell, or the one after ────────────────────
    let availability = if next.lane_occupied {
        overtake_availability(ctx, train, first_pos, first.descriptor())
    } else {
        let Some(&(second, second_pos)) = ahead.get(1) else { return PlanOutcome::None };
        if !own(1).lane_occupied {
            return PlanOutcome::None;
        }
        overtake_availability(ctx, train, second_pos, second.descriptor())
    };
    // A peer that may pass us is never overtaken.  Anything else that is not
    // an eligible peer only needs one clear cell to be passed.
    let clear_run = match availability {
        OvertakeAvailability::MayBeOvertaken => return PlanOutcome::None,
        OvertakeAvailability::OvertakeAvailable => ctx.config.overtake_clear_run,
        OvertakeAvailability::NoOvertakeAvailable => 1,
    };
    if t.road_kind == RoadKind::Tram
        || state.descriptor.is_lane_manoeuvre()
        || first.descriptor().is_lane_manoeuvre()
    {
        return PlanOutcome::None;
    }

    let opposite = other(0);
    if opposite.has_level_crossing || opposite.lane_occupied {
        return PlanOutcome::None;
    }
    let mut station = opposite.has_station;
    let mut run: u8 = 0;
    let mut count: u8 = 2;
    while count < ctx.config.overtake_horizon {
        let i = count as usize - 1;
        if i >= ahead.len() {
            return if station { PlanOutcome::ChangeLane(count - 1) } else { PlanOutcome::None };
        }
        let opposite = other(i);
        if opposite.has_level_crossing || opposite.lane_occupied {
            return PlanOutcome::None;
        }
        station = opposite.has_station;
        if own(i).lane_occupied {
            run = 0;
        } else {
            run += 1;
            if run >= clear_run {
                return PlanOutcome::Overtake(count);
            }
        }
        count += 1;
    }
    PlanOutcome::None
}
