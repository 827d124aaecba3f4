//! The motion accumulator: turns a distance into sub-position steps.
//!
//! Distance is banked in each component's `remainder`.  Every time the bank
//! holds at least one quantum the component steps to its next sample and pays
//! the step's cost from [`STEP_DISTANCE`], so the bank never goes negative and
//! is always below one quantum when the call returns.

use lm_core::{ComponentId, MotionFlags, Pos3, TileRect, TrainId, TransportMode};
use lm_routing::RoutingHandle;
use lm_track::TrackNetwork;
use lm_vehicle::{ComponentKind, MotionState};

use crate::context::MotionContext;
use crate::crash::find_collision;
use crate::sink::{EffectSink, ZOOM_VEHICLE};
use crate::transition::{Crossing, cross_boundary};

/// Cost of one step, indexed by the movement nibble (bit 0 x changed, bit 1
/// y changed, bit 2 z changed).
pub const STEP_DISTANCE: [i32; 8] = [0, 0x220C, 0x220C, 0x3027, 0x199A, 0x2A99, 0x2A99, 0x3689];

#[inline]
pub fn movement_nibble(from: Pos3, to: Pos3) -> usize {
    usize::from(from.x != to.x) | usize::from(from.y != to.y) << 1 | usize::from(from.z != to.z) << 2
}

#[inline]
pub fn step_distance(from: Pos3, to: Pos3) -> i32 {
    STEP_DISTANCE[movement_nibble(from, to)]
}

/// How a component relates to the train's reservations.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Role {
    /// Plans, checks occupancy, claims lanes.
    Lead,
    /// Traces the ring and may not step past the lead's cell.
    Follower { lead_handle: RoutingHandle },
}

/// Result of advancing one component.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct StepResult {
    pub flags:     MotionFlags,
    /// Distance handed back after a blocked transition.
    pub remaining: i32,
    /// Sum of the step costs actually paid.
    pub moved:     i32,
    pub collided:  Option<ComponentId>,
}

/// Advance component `c` of `train` by `distance`.
pub fn advance_component<N: TrackNetwork, S: EffectSink>(
    ctx:      &mut MotionContext<'_, N, S>,
    train:    TrainId,
    c:        ComponentId,
    distance: i32,
    role:     Role,
) -> StepResult {
    let quantum = ctx.config.quantum;
    let mode = ctx.vehicles.trains[train.index()].mode;
    let check_collisions = mode == TransportMode::Rail && ctx.vehicles.kind[c.index()] == ComponentKind::Bogie;

    let mut state: MotionState = ctx.vehicles.motion[c.index()];
    // Panics on a freed slot: a component must never outlive its cell.
    ctx.routing.current(state.handle);
    let start = state.position;
    let mut result = StepResult::default();
    state.remainder += distance;

    while state.remainder >= quantum {
        let len = ctx.geometry.samples(mode, state.descriptor).len();
        let mut next = state.sub_position as usize + 1;
        if next >= len {
            match cross_boundary(ctx, train, c, &mut state, role) {
                Crossing::Committed(flags) => {
                    result.flags |= flags;
                    next = 0;
                }
                Crossing::Blocked(flags) => {
                    result.flags |= flags;
                    result.remaining = state.remainder - (quantum - 1);
                    state.remainder = quantum - 1;
                    break;
                }
                Crossing::Resolved { moved } => {
                    result.moved += moved;
                    result.remaining = 0;
                    state.remainder = state.remainder.min(quantum - 1);
                    break;
                }
            }
        }

        let samples = ctx.geometry.samples(mode, state.descriptor);
        debug_assert!(next < samples.len(), "sub-position {next} out of range for {}", state.descriptor.key);
        let Some(sample) = samples.get(next).copied() else { break };
        let to = state.origin + sample.offset;
        let cost = step_distance(state.position, to);
        state.remainder -= cost;
        result.moved += cost;
        state.position = to;
        state.sub_position = next as u16;
        state.yaw = sample.yaw;
        state.pitch = sample.pitch;

        if check_collisions {
            if let Some(hit) = find_collision(ctx, c, to) {
                result.flags |= MotionFlags::CRASHED;
                result.collided = Some(hit);
            }
        }
    }

    let end = state.position;
    state.position = start;
    state.flags = result.flags;
    ctx.vehicles.motion[c.index()] = state;
    if end != start {
        ctx.vehicles.set_position(c, end);
        ctx.sink.invalidate(TileRect::spanning(start, end), ZOOM_VEHICLE);
    }
    result
}
