//! Target-speed resolver.
//!
//! Limits come from the cells the train already holds, read through a
//! backward ring view from the lead.  The tail frees cells as it leaves
//! them, so the walk covers exactly the train's own footprint.

use lm_core::{Speed16, Speed32, TrainId, TransportMode};
use lm_track::TrackNetwork;

use crate::context::MotionContext;
use crate::sink::EffectSink;

const ONE_MPH: Speed32 = Speed32(1 << 16);

/// What the held cells impose.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FootprintLimits {
    /// Tightest curve under the train; `0xFFFF` is straight.
    pub curve_fraction: u16,
    /// Lowest bridge limit under the train; `Speed16::MAX` if none.
    pub bridge_cap:     Speed16,
    pub rack_rail:      bool,
}

impl Default for FootprintLimits {
    fn default() -> Self {
        Self { curve_fraction: u16::MAX, bridge_cap: Speed16::MAX, rack_rail: false }
    }
}

pub fn footprint_limits<N: TrackNetwork, S: EffectSink>(ctx: &MotionContext<'_, N, S>, train: TrainId) -> FootprintLimits {
    let mut limits = FootprintLimits::default();
    let Some(t) = ctx.vehicles.train(train) else { return limits };
    let handle = ctx.vehicles.motion[t.lead().index()].handle;
    let table = ctx.table(t.mode);
    for (_, cell) in ctx.routing.ring_view(handle).backward() {
        limits.rack_rail |= cell.rack_rail;
        limits.curve_fraction = limits.curve_fraction.min(table.curve_speed_fraction(cell.key.id));
        if let Some(cap) = cell.bridge.and_then(|b| ctx.objects.bridge_speed(b)) {
            limits.bridge_cap = limits.bridge_cap.min(cap);
        }
    }
    limits
}

/// `nominal × fraction + 1 mph`, truncated, then capped.
#[inline]
fn curve_limited(nominal: Speed16, fraction: u16, cap: Speed16) -> Speed16 {
    Speed32(nominal.scaled(fraction).0.saturating_add(ONE_MPH.0)).to_speed16().min(cap)
}

#[inline]
fn with_curve_bonus(target: Speed16, nominal: Speed16, divisor: i16) -> Speed16 {
    target.saturating_add(Speed16(target.0 / divisor)).min(nominal)
}

/// Resolve the speed `train` should aim for this tick.
pub fn resolve_target_speed<N: TrackNetwork, S: EffectSink>(ctx: &MotionContext<'_, N, S>, train: TrainId) -> Speed16 {
    let Some(t) = ctx.vehicles.train(train) else { return Speed16::ZERO };
    let config = ctx.config;
    let manual = t.control.is_manual();

    let limits = if t.mode == TransportMode::Rail && manual {
        FootprintLimits::default()
    } else {
        footprint_limits(ctx, train)
    };

    let mut target = match t.mode {
        TransportMode::Road => match t.network_object.and_then(|id| ctx.objects.road(id)) {
            Some(road) => {
                let mut target = curve_limited(road.max_speed, limits.curve_fraction, limits.bridge_cap);
                target = target.max(config.road_min_speed);
                if t.faster_around_curves {
                    target = with_curve_bonus(target, road.max_speed, config.curve_bonus_divisor);
                }
                target
            }
            None => config.unknown_road_speed.scaled(limits.curve_fraction).to_speed16(),
        },
        TransportMode::Rail => match t.network_object.and_then(|id| ctx.objects.track(id)) {
            Some(track) => {
                let target = curve_limited(track.curve_speed, limits.curve_fraction, limits.bridge_cap);
                if t.faster_around_curves {
                    with_curve_bonus(target, track.curve_speed, config.curve_bonus_divisor)
                } else {
                    target
                }
            }
            None => limits.bridge_cap,
        },
    };

    let power_cap = if t.mode == TransportMode::Rail && t.broken_down {
        Speed16(t.max_speed.0 / 4)
    } else {
        t.max_speed
    };
    target = target.min(power_cap);

    if limits.rack_rail {
        target = target.min(t.rack_rail_max_speed);
    }

    if !manual {
        let covered = (t.lookahead_distance.max(0) as u32 >> 15).min(i16::MAX as u32) as i16;
        target = target.min(Speed16(covered).saturating_add(config.target_rate_slack));
    }

    if t.is_forced_stop(config.manual_stop_notch) && t.speed == Speed32::ZERO {
        target = Speed16::ZERO;
    }
    target
}
