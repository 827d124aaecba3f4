//! `MotionEngine`: the per-tick entry points `lm-sim` drives.

use log::debug;

use lm_core::{ComponentId, MotionFlags, Pos3, Speed16, TrainId, TransportMode};
use lm_track::TrackNetwork;

use crate::accumulator::{Role, advance_component};
use crate::context::MotionContext;
use crate::crash::{resolve_crash, update_wreck};
use crate::sink::{EffectSink, NATIVE_FREQUENCY, SoundId};
use crate::speed::resolve_target_speed;

/// Whistle samples a rail lead chooses from when nearing a crossing.
pub const WHISTLE_VARIANTS: [u8; 3] = [0, 1, 2];

/// Whistles heard from below ground are muffled by this much.
const UNDERGROUND_VOLUME: i32 = -1500;

const WHISTLE_LIFT: Pos3 = Pos3::new(0, 0, 22);

/// Result of one `advance` call on a whole train.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct AdvanceOutcome {
    /// Union of every component's flags.
    pub flags:     MotionFlags,
    /// Distance the lead handed back.
    pub remaining: i32,
    /// Distance the lead actually covered, including pieces moved through in
    /// one go by an overtake or crossing decision.
    pub moved:     i32,
    /// First component another component of this train ran into.
    pub collided:  Option<ComponentId>,
}

/// Stateless facade over the motion modules.  All state lives in the
/// [`MotionContext`] borrowed for each call.
pub struct MotionEngine;

impl MotionEngine {
    /// Move every component of `train` by `distance`.
    ///
    /// The lead goes first and may stop short; followers then cover exactly
    /// what the lead covered, and may not pass the lead's routing cell.  The
    /// lead's covered distance becomes the train's committed lookahead.
    pub fn advance<N: TrackNetwork, S: EffectSink>(
        ctx:      &mut MotionContext<'_, N, S>,
        train:    TrainId,
        distance: i32,
    ) -> AdvanceOutcome {
        let Some(t) = ctx.vehicles.train(train) else { return AdvanceOutcome::default() };
        if t.is_crashed() {
            return AdvanceOutcome { flags: MotionFlags::CRASHED, remaining: distance, ..Default::default() };
        }
        let mode = t.mode;
        let components = t.components.clone();
        let Some((&lead, followers)) = components.split_first() else { return AdvanceOutcome::default() };

        let head = advance_component(ctx, train, lead, distance.max(0), Role::Lead);
        let mut outcome = AdvanceOutcome {
            flags:     head.flags,
            remaining: head.remaining,
            moved:     head.moved,
            collided:  head.collided,
        };

        let lead_handle = ctx.vehicles.motion[lead.index()].handle;
        for &c in followers {
            let step = advance_component(ctx, train, c, head.moved, Role::Follower { lead_handle });
            outcome.flags |= step.flags;
            if step.collided.is_some() {
                outcome.collided = step.collided;
            }
        }

        if let Some(t) = ctx.vehicles.train_mut(train) {
            t.lookahead_distance = head.moved;
        }

        if mode == TransportMode::Rail && outcome.flags.contains(MotionFlags::APPROACHING_GRADE_CROSSING) {
            whistle(ctx, lead);
        }
        outcome
    }

    /// Resolve and store `train`'s target speed.
    pub fn update_target_speed<N: TrackNetwork, S: EffectSink>(ctx: &mut MotionContext<'_, N, S>, train: TrainId) -> Speed16 {
        let target = resolve_target_speed(ctx, train);
        if let Some(t) = ctx.vehicles.train_mut(train) {
            t.target_speed = target;
        }
        target
    }

    /// Crash `train` after an advance reported [`MotionFlags::CRASHED`].
    pub fn crash<N: TrackNetwork, S: EffectSink>(
        ctx:      &mut MotionContext<'_, N, S>,
        train:    TrainId,
        collided: Option<ComponentId>,
    ) {
        if let Some(hit) = collided {
            debug!("{train}: collision with {hit}");
        }
        resolve_crash(ctx, train, collided);
    }

    /// Ballistic tick for every destroyed component of `train`.
    pub fn update_wrecks<N: TrackNetwork, S: EffectSink>(ctx: &mut MotionContext<'_, N, S>, train: TrainId) {
        let Some(t) = ctx.vehicles.train(train) else { return };
        let components = t.components.clone();
        for c in components {
            update_wreck(ctx, c);
        }
    }
}

fn whistle<N: TrackNetwork, S: EffectSink>(ctx: &mut MotionContext<'_, N, S>, lead: ComponentId) {
    let variant = WHISTLE_VARIANTS[ctx.rng.pick(WHISTLE_VARIANTS.len())];
    let pos = ctx.vehicles.motion[lead.index()].position;
    let volume = if pos.z < ctx.network.surface(pos.tile()).land { UNDERGROUND_VOLUME } else { 0 };
    ctx.sink.play_sound(SoundId::Whistle(variant), pos + WHISTLE_LIFT, volume, NATIVE_FREQUENCY);
}
