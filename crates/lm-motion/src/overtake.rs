//! Overtake-eligibility: may this road vehicle pass the one ahead of it?

use lm_core::{Pos3, TrainId};
use lm_track::{PieceDescriptor, TrackNetwork};
use lm_vehicle::ComponentKind;

use crate::context::MotionContext;
use crate::sink::EffectSink;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OvertakeAvailability {
    /// The vehicle ahead is slower and further behind on its plan.
    OvertakeAvailable,
    /// The vehicle ahead is at least as fast; it may pass us instead.
    MayBeOvertaken,
    /// Nothing ahead qualifies.
    NoOvertakeAvailable,
}

/// Compare `me` with the first road vehicle whose tail sits on the piece at
/// `pos` with matching id and direction.
///
/// Peers with too little committed lookahead, or that are broken down, do
/// not count: they are about to move or will never move.
pub fn overtake_availability<N: TrackNetwork, S: EffectSink>(
    ctx:        &MotionContext<'_, N, S>,
    me:         TrainId,
    pos:        Pos3,
    descriptor: PieceDescriptor,
) -> OvertakeAvailability {
    let vehicles = &*ctx.vehicles;
    let Some(mine) = vehicles.train(me) else { return OvertakeAvailability::NoOvertakeAvailable };
    let bits = descriptor.key.basic_bits();

    for c in vehicles.components_near(pos.tile()) {
        if vehicles.kind[c.index()] != ComponentKind::Tail {
            continue;
        }
        let owner = vehicles.train_of[c.index()];
        if owner == me {
            continue;
        }
        let Some(peer) = vehicles.train(owner) else { continue };
        if !peer.mode.is_road() {
            continue;
        }
        let motion = &vehicles.motion[c.index()];
        if motion.origin != pos || motion.descriptor.key.basic_bits() != bits {
            continue;
        }
        if peer.lookahead_distance < ctx.config.min_overtake_peer_distance || peer.broken_down {
            continue;
        }
        if mine.lookahead_distance < peer.lookahead_distance || mine.max_speed <= peer.max_speed {
            return OvertakeAvailability::MayBeOvertaken;
        }
        return OvertakeAvailability::OvertakeAvailable;
    }
    OvertakeAvailability::NoOvertakeAvailable
}
