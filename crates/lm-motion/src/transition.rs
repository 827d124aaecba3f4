//! Piece-boundary transition: moving a component onto the next ring cell.

use log::{debug, trace};

use lm_core::{ComponentId, MotionFlags, Pos3, TrainId, TransportMode};
use lm_routing::RoutingCell;
use lm_track::TrackNetwork;
use lm_vehicle::{ComponentKind, LaneBits, MotionState};

use crate::accumulator::{Role, step_distance};
use crate::context::MotionContext;
use crate::planner::{self, PlanOutcome};
use crate::sink::EffectSink;

/// Outcome of one boundary crossing.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Crossing {
    /// Now on the next piece; the caller adopts its sample 0.
    Committed(MotionFlags),
    /// Nothing changed.  The slot was not consumed.
    Blocked(MotionFlags),
    /// The planner moved the lead through several pieces; the tick is over.
    Resolved { moved: i32 },
}

/// Try to move `c` from the end of its piece onto the next ring cell.
pub fn cross_boundary<N: TrackNetwork, S: EffectSink>(
    ctx:   &mut MotionContext<'_, N, S>,
    train: TrainId,
    c:     ComponentId,
    state: &mut MotionState,
    role:  Role,
) -> Crossing {
    let Some(cell) = ctx.routing.get_routing(state.handle.next()).cell() else {
        if role == Role::Lead {
            debug!("{train}: no route past {}", state.handle);
        }
        return Crossing::Blocked(MotionFlags::NO_ROUTE_FOUND);
    };
    if let Role::Follower { lead_handle } = role {
        if state.handle == lead_handle {
            return Crossing::Blocked(MotionFlags::BLOCKED_BY_LEAD);
        }
    }

    let (mode, manual) = {
        let t = &ctx.vehicles.trains[train.index()];
        (t.mode, t.control.is_manual())
    };

    if role == Role::Lead && !manual {
        match planner::plan(ctx, train, state) {
            PlanOutcome::None => {}
            PlanOutcome::NoRoute => return Crossing::Blocked(MotionFlags::LOOKAHEAD_EXHAUSTED),
            PlanOutcome::Overtake(n) => {
                debug!("{train}: overtaking over {n} pieces");
                stamp_overtake(ctx, train, state, n);
                return Crossing::Resolved { moved: move_by_pieces(ctx, train, c, state, n) };
            }
            PlanOutcome::ChangeLane(n) => {
                debug!("{train}: changing lane over {n} pieces");
                stamp_change_lane(ctx, train, state, n);
                return Crossing::Resolved { moved: move_by_pieces(ctx, train, c, state, n) };
            }
            PlanOutcome::LevelCrossing(n) => {
                debug!("{train}: crossing over {n} pieces");
                return Crossing::Resolved { moved: move_by_pieces(ctx, train, c, state, n) };
            }
        }
    }

    let Some(exit) = ctx.table(mode).exit(state.descriptor.key) else {
        return Crossing::Blocked(MotionFlags::NO_ROUTE_FOUND);
    };
    let next_origin = state.origin + exit.delta;
    let connections = ctx.network.connections(mode, next_origin, exit.heading);

    let mut flags = MotionFlags::EMPTY;
    if mode == TransportMode::Rail && connections.has_level_crossing {
        flags |= MotionFlags::APPROACHING_GRADE_CROSSING;
    }
    if !connections.reaches(cell.key) {
        if role == Role::Lead {
            debug!("{train}: {} is not reachable from {}", cell.key, state.descriptor.key);
        }
        return Crossing::Blocked(flags | MotionFlags::NO_ROUTE_FOUND);
    }

    if role == Role::Lead {
        match mode {
            TransportMode::Road => {
                let occupancy = ctx.network.occupancy(mode, next_origin, cell.descriptor());
                let committed = manual || on_crossing(ctx, mode, state);
                if occupancy.lane_occupied || (occupancy.crossing_closed && !committed) {
                    return Crossing::Blocked(MotionFlags::LOOKAHEAD_EXHAUSTED);
                }
            }
            TransportMode::Rail => {
                if connections.has_level_crossing {
                    ctx.network.set_crossing_closed(next_origin.tile(), true);
                }
            }
        }
    }

    commit(ctx, train, c, state, cell, next_origin);
    Crossing::Committed(flags)
}

/// Whether the component already stands on a level-crossing piece.
fn on_crossing<N: TrackNetwork, S: EffectSink>(ctx: &MotionContext<'_, N, S>, mode: TransportMode, state: &MotionState) -> bool {
    ctx.routing.get_routing(state.handle).cell().is_some_and(|c| c.level_crossing)
        || ctx.network.occupancy(mode, state.origin, state.descriptor).has_level_crossing
}

/// Adopt `cell` as the current piece.  The lead claims the new lane; the
/// tail hands back the piece it leaves.
fn commit<N: TrackNetwork, S: EffectSink>(
    ctx:         &mut MotionContext<'_, N, S>,
    train:       TrainId,
    c:           ComponentId,
    state:       &mut MotionState,
    cell:        RoutingCell,
    next_origin: Pos3,
) {
    let mode = ctx.vehicles.trains[train.index()].mode;
    let kind = ctx.vehicles.kind[c.index()];
    let (old_handle, old_origin, old_descriptor) = (state.handle, state.origin, state.descriptor);

    state.handle = state.handle.next();
    state.origin = next_origin;
    state.descriptor = cell.descriptor();
    trace!("{c} enters {} at {:?}", cell.key, next_origin);

    match kind {
        ComponentKind::Lead if mode.is_road() => {
            ctx.network.claim_lane(next_origin, state.descriptor);
            ctx.vehicles.trains[train.index()].lane = LaneBits {
                overtaking:    cell.overtaking,
                changing_lane: cell.changing_lane,
            };
        }
        ComponentKind::Tail => {
            match mode {
                TransportMode::Road => ctx.network.release_lane(old_origin, old_descriptor),
                TransportMode::Rail => {
                    if ctx.network.occupancy(mode, old_origin, old_descriptor).has_level_crossing {
                        ctx.network.set_crossing_closed(old_origin.tile(), false);
                    }
                }
            }
            ctx.routing.release(old_handle);
        }
        _ => {}
    }
}

/// Step the lead through `n` piece boundaries without planning or occupancy
/// checks, ending on sample 0 of the `n`th piece.  Returns the step costs,
/// which the engine books as committed lookahead.
pub fn move_by_pieces<N: TrackNetwork, S: EffectSink>(
    ctx:   &mut MotionContext<'_, N, S>,
    train: TrainId,
    c:     ComponentId,
    state: &mut MotionState,
    n:     u8,
) -> i32 {
    let mode = ctx.vehicles.trains[train.index()].mode;
    let mut moved = 0;
    let mut crossed = 0;
    while crossed < n {
        let mut next = state.sub_position as usize + 1;
        if next >= ctx.geometry.samples(mode, state.descriptor).len() {
            let Some(cell) = ctx.routing.get_routing(state.handle.next()).cell() else { break };
            let Some(next_origin) = ctx.next_origin(mode, state) else { break };
            commit(ctx, train, c, state, cell, next_origin);
            next = 0;
            crossed += 1;
        }
        let Some(sample) = ctx.geometry.samples(mode, state.descriptor).get(next).copied() else { break };
        let to = state.origin + sample.offset;
        moved += step_distance(state.position, to);
        state.position = to;
        state.sub_position = next as u16;
        state.yaw = sample.yaw;
        state.pitch = sample.pitch;
    }
    moved
}

// ── Stamping ──────────────────────────────────────────────────────────────────

/// Out through the first cell, opposite lane in the middle, back in on the
/// last.
fn stamp_overtake<N: TrackNetwork, S: EffectSink>(
    ctx:   &mut MotionContext<'_, N, S>,
    train: TrainId,
    state: &MotionState,
    n:     u8,
) {
    let mut last = LaneBits::default();
    ctx.routing.stamp_forward(state.handle, n as usize, |i, span, cell| {
        let (overtaking, changing_lane) = match i {
            0 => (false, true),
            _ if i + 1 == span => (true, true),
            _ => (true, false),
        };
        cell.set_lane_bits(overtaking, changing_lane);
        last = LaneBits { overtaking, changing_lane };
    });
    ctx.vehicles.trains[train.index()].lane = last;
}

/// Out through the first cell and stay in the other lane.
fn stamp_change_lane<N: TrackNetwork, S: EffectSink>(
    ctx:   &mut MotionContext<'_, N, S>,
    train: TrainId,
    state: &MotionState,
    n:     u8,
) {
    let mut last = LaneBits::default();
    ctx.routing.stamp_forward(state.handle, n as usize, |i, _, cell| {
        let (overtaking, changing_lane) = if i == 0 { (false, true) } else { (true, false) };
        cell.set_lane_bits(overtaking, changing_lane);
        last = LaneBits { overtaking, changing_lane };
    });
    ctx.vehicles.trains[train.index()].lane = last;
}
