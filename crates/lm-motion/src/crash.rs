//! Collision detection, crash resolution and the ballistic wreck tick.

use log::debug;

use lm_core::{ComponentId, Pos3, Speed16, Speed32, TileRect, TrainId, TransportMode};
use lm_track::{TrackNetwork, yaw_vector};
use lm_vehicle::TrainStatus;

use crate::context::MotionContext;
use crate::sink::{EffectSink, NATIVE_FREQUENCY, SoundId, VisualEffect, ZOOM_VEHICLE};

/// Bounding tolerances for two components touching.
const HIT_DZ:         i32 = 16;
const HIT_MANHATTAN:  i32 = 12;
/// Components this close in a chain overlap by construction.
const COUPLED_WINDOW: i32 = 8;

/// Height of the effect anchor above a component.
const EFFECT_LIFT: Pos3 = Pos3::new(0, 0, 22);

const FLY_THRESHOLD:     u32 = 0x1_0000;
const EXPLODE_THRESHOLD: u32 = 0x5_0000;
const STOP_THRESHOLD:    u32 = 8192;
const FALL_EXPLODE:      u8 = 10;

// ── Detection ─────────────────────────────────────────────────────────────────

/// First structural rail component of the same owner that `c` touches at
/// `pos`, scanning the 3×3 tiles around it.
pub fn find_collision<N: TrackNetwork, S: EffectSink>(
    ctx: &MotionContext<'_, N, S>,
    c:   ComponentId,
    pos: Pos3,
) -> Option<ComponentId> {
    let vehicles = &*ctx.vehicles;
    let me = vehicles.train_of[c.index()];
    let owner = vehicles.train(me)?.owner;
    let chain = i32::from(vehicles.chain_index[c.index()]);

    vehicles.components_near(pos.tile()).find(|&other| {
        if other == c || !vehicles.kind[other.index()].is_structural() {
            return false;
        }
        let peer = vehicles.train_of[other.index()];
        let Some(peer_train) = vehicles.train(peer) else { return false };
        if peer_train.mode != TransportMode::Rail || peer_train.owner != owner {
            return false;
        }
        let at = vehicles.motion[other.index()].position;
        if (at.z - pos.z).abs() > HIT_DZ || at.manhattan_xy(pos) >= HIT_MANHATTAN {
            return false;
        }
        peer != me || (chain - i32::from(vehicles.chain_index[other.index()])).abs() > COUPLED_WINDOW
    })
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// Crash `train` and, if it hit another train that is still running, that
/// train too.
pub fn resolve_crash<N: TrackNetwork, S: EffectSink>(
    ctx:      &mut MotionContext<'_, N, S>,
    train:    TrainId,
    collided: Option<ComponentId>,
) {
    destroy_train(ctx, train);
    let Some(hit) = collided else { return };
    let other = ctx.vehicles.train_of[hit.index()];
    if other != train && ctx.vehicles.train(other).is_some_and(|t| !t.is_crashed()) {
        destroy_train(ctx, other);
    }
}

fn destroy_train<N: TrackNetwork, S: EffectSink>(ctx: &mut MotionContext<'_, N, S>, train: TrainId) {
    let Some(t) = ctx.vehicles.train_mut(train) else { return };
    debug!("{train}: crashed at {}", t.speed.to_speed16());
    t.status = TrainStatus::Crashed;
    let velocity = t.speed.0.max(0) as u32;
    t.speed = Speed32::ZERO;
    t.target_speed = Speed16::ZERO;
    let components = t.components.clone();

    for c in components {
        if !ctx.vehicles.kind[c.index()].is_structural() || ctx.vehicles.wreck[c.index()].is_destroyed() {
            continue;
        }
        ctx.vehicles.wreck[c.index()].destroy(velocity);
        explode(ctx, c);
    }
}

fn explode<N: TrackNetwork, S: EffectSink>(ctx: &mut MotionContext<'_, N, S>, c: ComponentId) {
    ctx.vehicles.wreck[c.index()].exploded = true;
    let pos = ctx.vehicles.motion[c.index()].position;
    ctx.sink.play_sound(SoundId::Explode, pos + EFFECT_LIFT, 0, NATIVE_FREQUENCY);
    ctx.sink.spawn_effect(VisualEffect::ExplosionCloud, pos);
}

fn rotate_and_explode<N: TrackNetwork, S: EffectSink>(ctx: &mut MotionContext<'_, N, S>, c: ComponentId) {
    let state = &mut ctx.vehicles.motion[c.index()];
    state.yaw = state.yaw.wrapping_add(4) & 63;
    if !ctx.vehicles.wreck[c.index()].exploded {
        explode(ctx, c);
    }
}

/// Horizontal impact: fast wrecks spin and explode, all lose half their speed.
fn bounce<N: TrackNetwork, S: EffectSink>(ctx: &mut MotionContext<'_, N, S>, c: ComponentId) {
    let magnitude = ctx.vehicles.wreck[c.index()].magnitude();
    if magnitude >= EXPLODE_THRESHOLD {
        rotate_and_explode(ctx, c);
    }
    ctx.vehicles.wreck[c.index()].set_magnitude(magnitude / 2);
}

// ── Ballistic tick ────────────────────────────────────────────────────────────

/// Split 16.16 travel into whole units, carrying the 16-bit fraction.
#[inline]
fn carry(delta: i64, frac: &mut u16) -> i32 {
    let total = delta + i64::from(*frac);
    *frac = total.rem_euclid(0x1_0000) as u16;
    total.div_euclid(0x1_0000) as i32
}

/// One tick of flight for a destroyed component.  Components that were
/// never destroyed are left alone.
pub fn update_wreck<N: TrackNetwork, S: EffectSink>(ctx: &mut MotionContext<'_, N, S>, c: ComponentId) {
    let mut wreck = ctx.vehicles.wreck[c.index()];
    if !wreck.is_destroyed() {
        return;
    }

    let mut magnitude = wreck.magnitude();
    magnitude -= magnitude / 64;
    if magnitude <= STOP_THRESHOLD {
        magnitude = 0;
    }
    wreck.set_magnitude(magnitude);
    if magnitude < FLY_THRESHOLD {
        ctx.vehicles.wreck[c.index()] = wreck;
        return;
    }

    let pos = ctx.vehicles.motion[c.index()].position;
    let (vx, vy) = yaw_vector(ctx.vehicles.motion[c.index()].yaw);
    let dx = carry(i64::from(magnitude) * i64::from(vx) / 4096, &mut wreck.frac_x);
    let dy = carry(i64::from(magnitude) * i64::from(vy) / 4096, &mut wreck.frac_y);
    wreck.fall = wreck.fall.saturating_add(1);
    let dz = i32::from(wreck.fall / 32);
    let mut new = Pos3::new(pos.x + dx, pos.y + dy, pos.z - dz);
    ctx.vehicles.wreck[c.index()] = wreck;

    if !ctx.network.is_solid(pos) {
        if ctx.network.is_solid(Pos3::new(new.x, new.y, pos.z)) {
            new.x = pos.x;
            new.y = pos.y;
            bounce(ctx, c);
        }
        if ctx.network.is_solid(new) {
            new.z = pos.z;
            if ctx.vehicles.wreck[c.index()].fall >= FALL_EXPLODE {
                rotate_and_explode(ctx, c);
            }
            ctx.vehicles.wreck[c.index()].fall = 0;
        }
    }

    let surface = ctx.network.surface(new.tile());
    if surface.land >= pos.z || surface.land >= new.z {
        if surface.land < pos.z && surface.land >= new.z {
            new.z = pos.z;
            ctx.vehicles.wreck[c.index()].fall = 0;
        }
        new.x = pos.x;
        new.y = pos.y;
        bounce(ctx, c);
    }

    if let Some(water) = surface.water {
        if water < pos.z && water >= new.z {
            rotate_and_explode(ctx, c);
            if !ctx.vehicles.wreck[c.index()].splashed {
                ctx.vehicles.wreck[c.index()].splashed = true;
                let at = Pos3::new(pos.x, pos.y, water);
                ctx.sink.spawn_effect(VisualEffect::Splash, at);
                ctx.sink.play_sound(SoundId::Splash, at, 0, NATIVE_FREQUENCY);
            }
        }
    }

    ctx.vehicles.set_position(c, new);
    ctx.sink.invalidate(TileRect::spanning(pos, new), ZOOM_VEHICLE);
}
